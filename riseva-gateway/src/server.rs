//! HTTP server: the chat relay endpoint and health check.
//!
//! `POST /chat` validates the request, compiles the system instruction,
//! opens one streaming provider call and re-emits the provider's fragments
//! as an SSE response. All provider/transport failures collapse into one of
//! three shapes: a 4xx/503 JSON error before any stream is opened, or an
//! in-band `{"error": ...}` frame once headers are committed. The emitted
//! frame sequence always terminates.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{info, warn};

use riseva_core::{StreamEvent, UnitConfig, WireMessage};

use crate::prompt::compile_system_prompt;
use crate::state::AppState;

/// Only the most recent messages are forwarded to the provider; the compiled
/// system instruction is always prepended regardless of this window.
pub const HISTORY_WINDOW: usize = 20;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Gateway listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn invalid_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "messages array is required"})),
    )
        .into_response()
}

/// Chat relay handler - POST /chat
///
/// The body is parsed by hand so that an unreadable body and a missing
/// `messages` array answer with the same machine-readable 400 shape.
async fn chat_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            warn!("Rejected unparseable request body: {}", e);
            return invalid_request();
        }
    };

    // messages must be present and be an array of {role, content} pairs
    let Some(messages_value) = body.get("messages").filter(|v| v.is_array()) else {
        return invalid_request();
    };
    let messages: Vec<WireMessage> = match serde_json::from_value(messages_value.clone()) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("Rejected malformed messages array: {}", e);
            return invalid_request();
        }
    };

    let Some(provider) = state.provider.clone() else {
        // Distinct status/code pair: clients switch to offline fallback
        // mode instead of surfacing a generic failure.
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "no_api_key",
                "message": "OpenAI API key not configured",
            })),
        )
            .into_response();
    };

    let config = body
        .get("unitConfig")
        .cloned()
        .and_then(|value| match serde_json::from_value::<UnitConfig>(value) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring malformed unitConfig, using defaults: {}", e);
                None
            }
        })
        .unwrap_or_default()
        .normalized();

    let unit_name = body.get("unitName").and_then(Value::as_str).unwrap_or("");
    let course_name = body.get("courseName").and_then(Value::as_str).unwrap_or("");

    let system_prompt = compile_system_prompt(&config, unit_name, course_name);
    let bounded = bound_history(&messages).to_vec();

    info!(
        "Relaying chat turn: {} messages ({} forwarded)",
        messages.len(),
        bounded.len()
    );

    let events = provider.stream_chat(system_prompt, bounded);
    let deadline = Duration::from_secs(state.settings.model.request_timeout_secs);

    let sse_stream = relay_events(events, deadline)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.payload())));

    let mut response = Sse::new(sse_stream).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// The most recent [`HISTORY_WINDOW`] messages, bounding token cost.
pub fn bound_history(messages: &[WireMessage]) -> &[WireMessage] {
    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    &messages[start..]
}

/// Re-frame provider events for the client, enforcing termination.
///
/// Yields events in provider order, stops after the first terminal event,
/// and converts both a deadline expiry and an unexpected channel close into
/// an error frame. Every possible exit path ends the stream with `Done` or
/// `Error`.
pub fn relay_events(
    mut events: mpsc::Receiver<StreamEvent>,
    deadline: Duration,
) -> impl Stream<Item = StreamEvent> {
    async_stream::stream! {
        let deadline = tokio::time::Instant::now() + deadline;
        loop {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Err(_) => {
                    yield StreamEvent::Error("Provider response timed out".to_string());
                    break;
                }
                Ok(None) => {
                    yield StreamEvent::Error("Provider stream ended unexpectedly".to_string());
                    break;
                }
                Ok(Some(event)) => {
                    let terminal = event.is_terminal();
                    yield event;
                    if terminal {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn msgs(n: usize) -> Vec<WireMessage> {
        (0..n).map(|i| WireMessage::user(format!("m{i}"))).collect()
    }

    #[test]
    fn test_bound_history_keeps_most_recent() {
        let messages = msgs(25);
        let bounded = bound_history(&messages);
        assert_eq!(bounded.len(), HISTORY_WINDOW);
        assert_eq!(bounded.first().unwrap().content, "m5");
        assert_eq!(bounded.last().unwrap().content, "m24");
    }

    #[test]
    fn test_bound_history_passes_short_histories_through() {
        let messages = msgs(3);
        assert_eq!(bound_history(&messages).len(), 3);
    }

    #[tokio::test]
    async fn test_relay_ends_with_done_on_success() {
        let (tx, rx) = mpsc::channel(8);
        for event in [
            StreamEvent::Content("a".to_string()),
            StreamEvent::Content("b".to_string()),
            StreamEvent::Done,
        ] {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let frames: Vec<StreamEvent> = relay_events(rx, Duration::from_secs(5)).collect().await;
        assert_eq!(
            frames,
            vec![
                StreamEvent::Content("a".to_string()),
                StreamEvent::Content("b".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_stops_after_error_event() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Content("partial".to_string()))
            .await
            .unwrap();
        tx.send(StreamEvent::Error("boom".to_string())).await.unwrap();
        tx.send(StreamEvent::Content("never seen".to_string()))
            .await
            .unwrap();
        drop(tx);

        let frames: Vec<StreamEvent> = relay_events(rx, Duration::from_secs(5)).collect().await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], StreamEvent::Error("boom".to_string()));
    }

    #[tokio::test]
    async fn test_relay_converts_dropped_channel_into_error() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Content("a".to_string())).await.unwrap();
        drop(tx);

        let frames: Vec<StreamEvent> = relay_events(rx, Duration::from_secs(5)).collect().await;
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[1], StreamEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_relay_converts_timeout_into_error() {
        let (tx, rx) = mpsc::channel::<StreamEvent>(8);

        let frames: Vec<StreamEvent> =
            relay_events(rx, Duration::from_millis(10)).collect().await;
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], StreamEvent::Error(_)));
        drop(tx);
    }
}
