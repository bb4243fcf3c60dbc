pub mod api; // HTTP host layer
pub mod config;
pub mod core_state; // Fetcher + last-result slot
pub mod models;
pub mod triage; // Risk scoring + alert classification
pub mod upstream; // Clinical API client, pagination, retry

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Fatal errors while bringing the service up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("State initialisation failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service entry point: logging, config, state, server, then wait for Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let core = Arc::new(core_state::CoreState::from_config(&config)?);
    let server = api::start_server_on(core, config.bind_addr()).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, shutting down");
    server.stop().await;

    Ok(())
}
