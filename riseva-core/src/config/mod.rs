//! Configuration management for riseva.
//!
//! Secrets (API keys) come from environment variables only; settings come
//! from an optional TOML file with env overrides.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - streaming provider credential
//!
//! ## Settings (TOML File)
//! Located at `riseva.toml` (or the path in `RISEVA_CONFIG`):
//! ```toml
//! [gateway]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [model]
//! model = "gpt-4o-mini"
//! temperature = 0.7
//! max_tokens = 800
//! request_timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! ```

mod secrets;
mod settings;
mod unit;

pub use secrets::Secrets;
pub use settings::{GatewaySettings, LoggingSettings, ModelSettings, Settings, SettingsError};
pub use unit::{
    Approach, Boundary, Capability, CourseMaterial, MaterialKind, Objective, ResponseLength, Tone,
    UnitConfig, SCAFFOLDING_MAX, SCAFFOLDING_MIN,
};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Config {
    /// Load the full configuration: `.env`, environment secrets, TOML
    /// settings, env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let settings = Settings::load()?;
        Ok(Self { secrets, settings })
    }
}
