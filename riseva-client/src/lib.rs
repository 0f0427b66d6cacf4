//! Client-side consumer for the Riseva chat relay.
//!
//! Owns the pieces that live next to the student-facing surface: the
//! streaming turn driver ([`chat::ChatClient`]), the offline canned-response
//! table ([`fallback`]), and session persistence ([`store`]).

pub mod chat;
pub mod fallback;
pub mod store;

pub use chat::{ChatClient, ClientError, EMPTY_REPLY_MESSAGE};
pub use fallback::{DEFAULT_FALLBACK, fallback_kind, fallback_response};
pub use store::{ChatSession, MemoryStore, SessionStore, SessionUsage};
