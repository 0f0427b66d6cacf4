//! The relay stream protocol: one tagged event type at the gateway/client
//! boundary, plus the SSE framing used to carry it.
//!
//! Frames are `data: <payload>\n\n` lines where the payload is either a
//! `{"content": ...}` fragment, a `{"error": ...}` signal, or the literal
//! `[DONE]` sentinel. Provider-specific wire formats are parsed into
//! [`StreamEvent`] at the single point of contact; nothing downstream ever
//! inspects raw provider JSON.

use serde::{Deserialize, Serialize};

/// Terminal sentinel payload closing a successful stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One unit of the relay's output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental text fragment of the assistant reply.
    Content(String),
    /// Successful end of stream.
    Done,
    /// In-band failure signal; the stream closes right after.
    Error(String),
}

#[derive(Serialize, Deserialize)]
struct FramePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Content(_))
    }

    /// The SSE `data:` payload for this event.
    pub fn payload(&self) -> String {
        match self {
            StreamEvent::Content(content) => serde_json::to_string(&FramePayload {
                content: Some(content.clone()),
                error: None,
            })
            .unwrap_or_else(|_| "{}".to_string()),
            StreamEvent::Done => DONE_SENTINEL.to_string(),
            StreamEvent::Error(error) => serde_json::to_string(&FramePayload {
                content: None,
                error: Some(error.clone()),
            })
            .unwrap_or_else(|_| "{}".to_string()),
        }
    }

    /// The full wire frame, `data:` prefix and blank-line terminator included.
    pub fn encode_frame(&self) -> String {
        format!("data: {}\n\n", self.payload())
    }

    /// Parse a single `data:` payload back into an event.
    ///
    /// Returns `None` for payloads that are neither the sentinel nor a
    /// well-formed frame object; callers skip those lines.
    pub fn from_payload(payload: &str) -> Option<StreamEvent> {
        let payload = payload.trim();
        if payload == DONE_SENTINEL {
            return Some(StreamEvent::Done);
        }
        let parsed: FramePayload = serde_json::from_str(payload).ok()?;
        if let Some(error) = parsed.error {
            return Some(StreamEvent::Error(error));
        }
        parsed.content.map(StreamEvent::Content)
    }
}

/// Incremental line buffer over an SSE byte stream.
///
/// Accepts arbitrarily split chunks and yields the payload of each complete
/// `data:` line in arrival order. Comment lines and blank separators are
/// skipped.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buf: String,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of the transport stream.
    pub fn push(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
    }

    /// Next complete `data:` payload, if one is fully buffered.
    pub fn next_payload(&mut self) -> Option<String> {
        while let Some(pos) = self.buf.find('\n') {
            let line = self.buf[..pos].trim().to_string();
            self.buf.drain(..=pos);

            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            if let Some(payload) = line.strip_prefix("data:") {
                return Some(payload.trim_start().to_string());
            }
            // Non-data SSE fields (event:, id:, retry:) are not part of the
            // relay protocol; skip them.
        }
        None
    }
}

/// Decoder from raw response bytes to ordered [`StreamEvent`]s.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    lines: SseLineBuffer,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns every event completed by it, in order.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.lines.push(&String::from_utf8_lossy(chunk));
        let mut events = Vec::new();
        while let Some(payload) = self.lines.next_payload() {
            if let Some(event) = StreamEvent::from_payload(&payload) {
                events.push(event);
            }
        }
        events
    }
}
