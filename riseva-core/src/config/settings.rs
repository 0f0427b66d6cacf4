//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in an optional `riseva.toml` next to the
//! process (or at the path in `RISEVA_CONFIG`). Everything has a serde
//! default so a missing file yields a fully working configuration;
//! `RISEVA_HOST` / `RISEVA_PORT` override the gateway bind address.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Non-sensitive settings loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Gateway bind configuration
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Model and generation parameters for the streaming provider
    #[serde(default)]
    pub model: ModelSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Gateway HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Host to bind to
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

impl GatewaySettings {
    /// The socket address to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Model selection and the fixed generation parameters for every tutoring
/// turn. Temperature and the output ceiling are deliberately constants of the
/// deployment, not per-request knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token ceiling per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Ceiling on total provider-call duration. On expiry the relay emits an
    /// error frame and closes the stream.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    800
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid {field} override: {value}")]
    InvalidOverride { field: &'static str, value: String },
}

impl Settings {
    /// Load settings from the default location plus env overrides.
    ///
    /// Resolution order: `RISEVA_CONFIG` path if set, else `riseva.toml` in
    /// the working directory if present, else pure defaults. Env overrides
    /// are applied last.
    pub fn load() -> Result<Self, SettingsError> {
        let path = match env::var("RISEVA_CONFIG") {
            Ok(p) => Some(PathBuf::from(p)),
            Err(_) => {
                let default = PathBuf::from("riseva.toml");
                default.exists().then_some(default)
            }
        };

        let mut settings = match path {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    /// Load settings from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        if let Ok(host) = env::var("RISEVA_HOST") {
            if !host.trim().is_empty() {
                self.gateway.host = host;
            }
        }
        if let Ok(port) = env::var("RISEVA_PORT") {
            self.gateway.port =
                port.parse()
                    .map_err(|_| SettingsError::InvalidOverride {
                        field: "RISEVA_PORT",
                        value: port,
                    })?;
        }
        Ok(())
    }
}
