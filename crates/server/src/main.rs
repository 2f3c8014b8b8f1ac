//! Crop Server - crop recommendation prediction API
//!
//! Loads the trained model once at startup and serves predictions
//! until interrupted.

use anyhow::Result;
use crop_lib::observability::{ServiceMetrics, StructuredLogger};
use crop_server::{api, config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_NAME: &str = "crop-server";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting crop-server");

    let config = config::ServerConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        model_path = %config.model_path.display(),
        "Server configured"
    );

    let metrics = ServiceMetrics::new();
    let logger = StructuredLogger::new(SERVICE_NAME);

    // The artifact is read exactly once, before the listener starts
    let app_state = Arc::new(api::AppState::load(
        config.model_path.clone(),
        metrics,
        logger.clone(),
    ));
    logger.log_startup(api::API_VERSION, &config.bind_addr(), app_state.model_loaded());

    let shutdown_logger = logger.clone();
    api::serve(&config, app_state, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        shutdown_logger.log_shutdown("SIGINT received");
    })
    .await?;

    info!("Shutting down");
    Ok(())
}
