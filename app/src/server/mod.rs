//! HTTP server for the box office.
//!
//! - Application state management
//! - Router configuration
//! - Health, readiness and metrics endpoints
//! - Graceful shutdown

pub mod health;
pub mod routes;
pub mod state;

pub use boxoffice_core::StorageProbe;
pub use routes::build_router;
pub use state::AppState;

use axum::Router;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

/// Errors that stop the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Binding or serving failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The serving task panicked or was aborted
    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Serve `router` on `listener` until Ctrl+C or SIGTERM, then give in-flight
/// requests `drain_timeout` to finish.
///
/// # Errors
///
/// Returns [`ServerError`] if serving fails before or during shutdown.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    drain_timeout: Duration,
) -> Result<(), ServerError> {
    let shutdown = std::sync::Arc::new(tokio::sync::Notify::new());
    let trigger = std::sync::Arc::clone(&shutdown);

    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { trigger.notified().await })
            .await
    });

    tokio::select! {
        finished = &mut server => {
            finished??;
            tracing::warn!("HTTP server stopped without a shutdown signal");
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    tracing::info!(
        drain_timeout_secs = drain_timeout.as_secs(),
        "Shutting down gracefully, draining in-flight requests"
    );
    shutdown.notify_one();

    match tokio::time::timeout(drain_timeout, server).await {
        Ok(finished) => finished??,
        Err(_) => tracing::warn!("Drain timeout elapsed, abandoning open connections"),
    }

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
}
