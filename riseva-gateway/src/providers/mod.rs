//! Model-provider clients.
//!
//! One point of contact with the provider wire format: everything downstream
//! of this module consumes [`riseva_core::StreamEvent`]s only.

pub mod openai;

pub use openai::{OpenAiClient, ProviderError};
