//! Shared application state.
//!
//! The relay is stateless between requests: the state holds only the
//! provider client (absent when no credential is configured) and the
//! settings. Nothing here is mutated after startup.

use riseva_core::{Config, Settings};

use crate::providers::OpenAiClient;

/// Shared application state
pub struct AppState {
    /// Streaming provider client; `None` when OPENAI_API_KEY is not set,
    /// which makes /chat answer 503 `no_api_key`.
    pub provider: Option<OpenAiClient>,
    /// Non-sensitive settings
    pub settings: Settings,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let provider = config
            .secrets
            .openai_api_key
            .as_ref()
            .map(|key| OpenAiClient::new(key.clone(), &config.settings.model));

        Self {
            provider,
            settings: config.settings,
        }
    }
}
