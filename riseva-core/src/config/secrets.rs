//! Secrets configuration loaded from environment variables only.
//!
//! Sensitive values are never read from files. A missing provider key is not
//! a load error: the relay answers 503 `no_api_key` and clients switch to
//! offline fallback mode, so the gateway must still start without it.

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Loads a `.env` file first if present (development convenience);
    /// production should rely on actual environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env_inner()
    }

    pub(crate) fn from_env_inner() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }

    /// Whether the streaming provider can be called at all.
    pub fn has_provider(&self) -> bool {
        self.openai_api_key.is_some()
    }
}
