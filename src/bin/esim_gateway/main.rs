//! eSIM gateway HTTP server

use std::process;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;
use esim_gateway::CancellationToken;

mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| e.exit());

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let state = AppState::from_config(&config).unwrap_or_else(|e| {
        error!(error = %e, "Invalid BNESIM configuration");
        process::exit(1);
    });

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!(error = %e, "Failed to bind {addr}");
        process::exit(1);
    });

    info!(
        poll_attempts = config.poll_attempts,
        poll_interval_ms = config.poll_interval_ms,
        "Starting server on {addr}"
    );

    let shutdown = state.shutdown.clone();
    if let Err(e) = axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
    {
        error!(error = %e, "Server error");
        process::exit(1);
    }

    info!("Server stopped");
}

/// Wait for Ctrl+C or SIGTERM, then cancel in-flight provisioning runs.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl_c signal received"),
        _ = terminate => info!("terminate signal received"),
    }

    shutdown.cancel();
}
