use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use riseva_gateway::server;
use riseva_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first so the log level setting can apply
    let config = riseva_core::Config::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.clone().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.secrets.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; /chat will answer 503 no_api_key");
    }
    info!(
        "Using model {} (temperature {}, max_tokens {})",
        config.settings.model.model,
        config.settings.model.temperature,
        config.settings.model.max_tokens
    );

    let bind_addr = config.settings.gateway.bind_addr();
    let state = Arc::new(AppState::from_config(config));

    server::run(state, &bind_addr).await
}
