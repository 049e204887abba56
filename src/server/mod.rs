//! Mock API server: routing, session gating, and simulated transfers.
//!
//! Every JSON endpoint answers with the shared envelope; authentication
//! failures on those routes are envelope failures carried over HTTP 200.
//! Only the binary download routes fail at the transport level (401/404),
//! since they cannot switch to a JSON body once committed to binary output.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};

use crate::common::AppConfig;

pub use error::AppError;
pub use state::AppState;

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::new(
        config.server.identity.clone(),
        config.server.delays,
    );
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind((config.server.bind.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.server.bind, config.server.port
            )
        })?;
    let addr = listener.local_addr().context("local_addr")?;
    tracing::info!("mock API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Ctrl+C received - shutting down");
}
