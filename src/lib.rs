pub mod accounts;
pub mod api;
pub mod appointment;
pub mod auth;
pub mod authorization;
pub mod config;
pub mod core_state;
pub mod db;
pub mod error;
pub mod models;
pub mod records;
pub mod validation;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::core_state::{CoreError, CoreState};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Core(#[from] CoreError),
    #[error("Server error: {0}")]
    Server(#[from] api::ServerError),
    #[error("Cannot listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config::log_filter_from_env()))
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    // A subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration, migrate the database and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");
    let bind_addr = config.bind_addr;

    let core = Arc::new(CoreState::new(config));
    core.prepare_storage()?;

    let server = api::start_api_server(core, bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    tracing::info!("Shutdown requested");
    server.stop().await;
    Ok(())
}
