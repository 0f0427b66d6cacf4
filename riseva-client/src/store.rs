//! Session persistence port.
//!
//! The consumer depends on an abstract store, not a concrete backend: a
//! browser localStorage shim, a database client, and the in-memory test
//! double all fit behind [`SessionStore`]. Writes are last-write-wins per
//! session; usage records are fire-and-forget accounting.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use riseva_core::ConversationMessage;

/// A tutoring session: one conversation against one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub unit_id: String,
    pub started_at: DateTime<Utc>,
    pub messages: Vec<ConversationMessage>,
    pub questions_asked: u32,
}

impl ChatSession {
    pub fn new(unit_id: impl Into<String>) -> Self {
        Self {
            id: format!("sess_{}", Uuid::new_v4()),
            unit_id: unit_id.into(),
            started_at: Utc::now(),
            messages: Vec::new(),
            questions_asked: 0,
        }
    }

    /// Elapsed whole minutes since the session started.
    pub fn elapsed_minutes(&self) -> i64 {
        (Utc::now() - self.started_at).num_minutes()
    }
}

/// Accounting record emitted on turn completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUsage {
    pub session_id: String,
    pub message_count: usize,
    pub duration_minutes: i64,
}

/// Abstract persistence port for sessions and usage accounting.
pub trait SessionStore: Send + Sync {
    fn load_session(&self, id: &str) -> Option<ChatSession>;
    fn save_session(&self, session: &ChatSession);
    /// Fire-and-forget; implementations must not fail the calling turn.
    fn record_usage(&self, usage: SessionUsage);
}

/// In-memory store: the default for tests and demo mode.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, ChatSession>>,
    usage: Mutex<Vec<SessionUsage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usage records seen so far, in emission order.
    pub fn usage_records(&self) -> Vec<SessionUsage> {
        self.usage.lock().expect("usage lock poisoned").clone()
    }
}

impl SessionStore for MemoryStore {
    fn load_session(&self, id: &str) -> Option<ChatSession> {
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .get(id)
            .cloned()
    }

    fn save_session(&self, session: &ChatSession) {
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .insert(session.id.clone(), session.clone());
    }

    fn record_usage(&self, usage: SessionUsage) {
        self.usage.lock().expect("usage lock poisoned").push(usage);
    }
}
