//! Startup helpers for the SiteGen builder server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::SiteGenConfig;
use crate::server::{self, AppState};

/// Run the server (used by the `sitegen` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting SiteGen v{}", env!("CARGO_PKG_VERSION"));

    let (state, config) = match initialize() {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, config.port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("SiteGen stopped");
    ExitCode::SUCCESS
}

/// Read the configuration and build the application state without starting
/// the server.
///
/// # Errors
/// Returns an error if the configuration is incomplete or state creation fails.
pub fn initialize() -> Result<(Arc<AppState>, SiteGenConfig), Box<dyn std::error::Error + Send + Sync>> {
    let config = SiteGenConfig::from_env()?;
    tracing::info!("Model: {} (temperature {})", config.model, config.temperature);
    tracing::info!("Static client: {}", config.static_dir.display());

    let state = AppState::new(&config)?;
    Ok((state, config))
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
