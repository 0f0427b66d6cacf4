//! OpenAI-compatible streaming chat client.
//!
//! Calls the Chat Completions API with `stream: true` and converts the
//! provider's SSE delta chunks into ordered [`StreamEvent`]s. Every exit
//! path ends the emitted sequence with exactly one terminal event, so the
//! relay never has to guess whether a stream is finished.

use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use riseva_core::{ChatRole, ModelSettings, SseLineBuffer, StreamEvent, WireMessage};

/// Channel depth for in-flight stream events.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Errors that can occur when calling the provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {message}")]
    ApiError { message: String },
}

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

/// OpenAI-compatible message format
#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

/// One streamed completion chunk
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client from the provider credential and model settings.
    pub fn new(api_key: impl Into<String>, model: &ModelSettings) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(model.request_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key: api_key.into(),
            base_url: model.base_url.trim_end_matches('/').to_string(),
            model: model.model.clone(),
            temperature: model.temperature,
            max_tokens: model.max_tokens,
        }
    }

    /// Current model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Open a streaming chat completion.
    ///
    /// The system instruction is always the first message. The returned
    /// channel yields content fragments in provider order and closes after
    /// exactly one terminal event (`Done` or `Error`).
    pub fn stream_chat(
        &self,
        system_prompt: String,
        messages: Vec<WireMessage>,
    ) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let client = self.clone();

        tokio::spawn(async move {
            if let Err(e) = client.pump_stream(system_prompt, messages, &tx).await {
                warn!("Provider stream failed: {}", e);
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            }
        });

        rx
    }

    /// Drive one provider call, emitting events on `tx`.
    ///
    /// On `Ok(())` a `Done` event has already been sent; on `Err` the caller
    /// sends the single `Error` event.
    async fn pump_stream(
        &self,
        system_prompt: String,
        messages: Vec<WireMessage>,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> Result<(), ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut api_messages = Vec::with_capacity(messages.len() + 1);
        api_messages.push(OpenAiMessage {
            role: "system",
            content: system_prompt,
        });
        api_messages.extend(messages.into_iter().map(|m| OpenAiMessage {
            role: match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            },
            content: m.content,
        }));

        let request_body = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: api_messages,
            stream: true,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                message: format!("HTTP {}: {}", status, error_text),
            });
        }

        let mut byte_stream = response.bytes_stream();
        let mut lines = SseLineBuffer::new();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk?;
            lines.push(&String::from_utf8_lossy(&chunk));

            while let Some(payload) = lines.next_payload() {
                if payload == riseva_core::stream::DONE_SENTINEL {
                    let _ = tx.send(StreamEvent::Done).await;
                    return Ok(());
                }

                let parsed: StreamChunk = match serde_json::from_str(&payload) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        debug!("Skipping unparseable provider chunk: {}", e);
                        continue;
                    }
                };

                if let Some(choice) = parsed.choices.first() {
                    if let Some(content) = &choice.delta.content {
                        if !content.is_empty()
                            && tx.send(StreamEvent::Content(content.clone())).await.is_err()
                        {
                            // Receiver gone, nothing left to relay to.
                            return Ok(());
                        }
                    }
                    if choice.finish_reason.is_some() {
                        let _ = tx.send(StreamEvent::Done).await;
                        return Ok(());
                    }
                }
            }
        }

        // Provider closed the connection without an explicit sentinel; the
        // response is complete as far as we can tell.
        let _ = tx.send(StreamEvent::Done).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings(base_url: &str) -> ModelSettings {
        ModelSettings {
            base_url: base_url.to_string(),
            ..ModelSettings::default()
        }
    }

    #[test]
    fn test_client_creation_normalizes_base_url() {
        let client = OpenAiClient::new("test-key", &test_settings("https://api.example.com/v1/"));
        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_stream_chunk_parsing() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"id":"c1","choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hel"));
        assert!(chunk.choices[0].finish_reason.is_none());

        let done: StreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(done.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_single_error_event() {
        let client = OpenAiClient::new("test-key", &test_settings("http://127.0.0.1:9"));
        let mut rx = client.stream_chat("system".to_string(), vec![WireMessage::user("hi")]);

        let first = rx.recv().await.expect("expected a terminal event");
        assert!(matches!(first, StreamEvent::Error(_)));
        assert!(rx.recv().await.is_none());
    }
}
