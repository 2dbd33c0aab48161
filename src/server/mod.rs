//! HTTP server hosting the builder.
//!
//! Provides:
//! - Session lifecycle (open, inspect, close)
//! - Generation rounds
//! - Sandboxed preview documents and frames
//! - Artifact export
//! - The static builder client

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use crate::config::DEFAULT_PORT;

/// How often idle sessions are swept between requests.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Start the HTTP server with graceful shutdown support.
///
/// The server will stop accepting new connections when `shutdown_signal` completes.
/// A background task drops idle sessions while the server runs.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let sweeper_state = Arc::clone(&state);
    let app: Router = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("SiteGen builder listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let sweeper = tokio::spawn(sweep_sessions(sweeper_state));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    sweeper.abort();
    Ok(())
}

async fn sweep_sessions(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        state.sessions.sweep_expired();
    }
}
