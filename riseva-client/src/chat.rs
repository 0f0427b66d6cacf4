//! The stream consumer: drives one tutoring turn against the relay.
//!
//! A turn always resolves into a complete, non-empty assistant message. The
//! live path accumulates SSE content frames into a placeholder message; the
//! offline path (relay unreachable, 503 `no_api_key`, or an in-band error
//! frame) discards any partial content and substitutes a canned response.
//! Only one turn may be in flight per client at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use reqwest::StatusCode;
use tracing::{info, warn};
use uuid::Uuid;

use riseva_core::{
    ChatRole, ChatTurnRequest, ConversationMessage, FrameDecoder, MessageKind, StreamEvent,
    UnitConfig,
};

use crate::fallback::{fallback_kind, fallback_response};
use crate::store::{ChatSession, SessionStore, SessionUsage};

/// Substitute reply when the provider finishes without emitting any content.
pub const EMPTY_REPLY_MESSAGE: &str =
    "I didn't catch a response there. Could you try asking that again?";

/// Errors surfaced to the caller.
///
/// Transport and relay failures are NOT errors here; they resolve into a
/// fallback message. The only rejection is a concurrent send.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("A turn is already in flight; wait for it to complete")]
    TurnInFlight,
}

/// How the streaming leg of a turn ended.
enum TurnOutcome {
    /// Terminal sentinel received; content fully accumulated.
    Completed,
    /// Transport failure, 503, or in-band error frame.
    Failed,
}

/// Client for the chat relay endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    in_flight: AtomicBool,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit one tutoring turn and resolve it to a finished assistant
    /// message.
    ///
    /// Appends the user turn and a pending assistant placeholder to the
    /// session, streams the reply into the placeholder, and on any failure
    /// replaces it with the fallback response. On every terminal state the
    /// session is persisted and a usage record is emitted.
    pub async fn send_turn(
        &self,
        session: &mut ChatSession,
        unit_config: &UnitConfig,
        unit_name: &str,
        course_name: &str,
        user_text: &str,
    ) -> Result<ConversationMessage, ClientError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::TurnInFlight);
        }

        let message = self
            .run_turn(session, unit_config, unit_name, course_name, user_text)
            .await;
        self.in_flight.store(false, Ordering::Release);
        Ok(message)
    }

    async fn run_turn(
        &self,
        session: &mut ChatSession,
        unit_config: &UnitConfig,
        unit_name: &str,
        course_name: &str,
        user_text: &str,
    ) -> ConversationMessage {
        session.messages.push(ConversationMessage::new(
            new_message_id(),
            ChatRole::User,
            user_text,
        ));
        session.questions_asked += 1;

        // The request is built before the placeholder exists, so the pending
        // assistant bubble is never forwarded to the provider.
        let request = ChatTurnRequest {
            messages: session.messages.iter().map(|m| m.to_wire()).collect(),
            unit_config: Some(unit_config.clone()),
            unit_name: Some(unit_name.to_string()),
            course_name: Some(course_name.to_string()),
        };

        let placeholder_idx = session.messages.len();
        session.messages.push(ConversationMessage::new(
            new_message_id(),
            ChatRole::Assistant,
            "",
        ));

        let outcome = self.stream_into(&request, session, placeholder_idx).await;

        let placeholder = &mut session.messages[placeholder_idx];
        match outcome {
            TurnOutcome::Completed if placeholder.content.is_empty() => {
                // Provider signalled done without any content fragments.
                placeholder.content = EMPTY_REPLY_MESSAGE.to_string();
                placeholder.kind = Some(MessageKind::Normal);
            }
            TurnOutcome::Completed => {
                placeholder.kind = Some(MessageKind::Normal);
            }
            TurnOutcome::Failed => {
                // Discard partial content; never show a truncated message.
                placeholder.content = fallback_response(user_text).to_string();
                placeholder.kind = Some(fallback_kind(user_text));
            }
        }
        let message = placeholder.clone();

        self.store.save_session(session);
        self.store.record_usage(SessionUsage {
            session_id: session.id.clone(),
            message_count: session.messages.len(),
            duration_minutes: session.elapsed_minutes(),
        });

        message
    }

    /// Stream the relay response into the placeholder message, in order.
    async fn stream_into(
        &self,
        request: &ChatTurnRequest,
        session: &mut ChatSession,
        placeholder_idx: usize,
    ) -> TurnOutcome {
        let url = format!("{}/chat", self.base_url);

        let response = match self.http.post(&url).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Chat request failed, switching to fallback: {}", e);
                return TurnOutcome::Failed;
            }
        };

        match response.status() {
            StatusCode::SERVICE_UNAVAILABLE => {
                info!("Relay reports no provider credential; using offline fallback");
                return TurnOutcome::Failed;
            }
            status if !status.is_success() => {
                warn!("Relay answered {}, switching to fallback", status);
                return TurnOutcome::Failed;
            }
            _ => {}
        }

        let mut byte_stream = response.bytes_stream();
        let mut decoder = FrameDecoder::new();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Stream transport dropped: {}", e);
                    return TurnOutcome::Failed;
                }
            };

            for event in decoder.push_bytes(&chunk) {
                match event {
                    StreamEvent::Content(fragment) => {
                        session.messages[placeholder_idx].content.push_str(&fragment);
                    }
                    StreamEvent::Done => return TurnOutcome::Completed,
                    StreamEvent::Error(message) => {
                        warn!("Relay signalled stream error: {}", message);
                        return TurnOutcome::Failed;
                    }
                }
            }
        }

        // The relay contract says every stream ends in a terminal frame; a
        // body that just stops is a transport failure.
        warn!("Stream ended without a terminal frame");
        TurnOutcome::Failed
    }
}

fn new_message_id() -> String {
    format!("msg_{}", Uuid::new_v4())
}
