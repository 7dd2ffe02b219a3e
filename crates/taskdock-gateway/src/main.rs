// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Taskdock Gateway - HTTP API server
//!
//! Serves the public task API and delegates every operation to the task
//! backend over QUIC.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use taskdock_gateway::backend::RpcTaskBackend;
use taskdock_gateway::config::Config;
use taskdock_gateway::routes::create_router;
use taskdock_gateway::shutdown::{self, Outcome, ShutdownCoordinator};
use taskdock_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskdock_gateway=info".parse().unwrap()),
        )
        .init();

    info!("Starting Taskdock Gateway");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_addr = %config.http_addr,
        backend_addr = %config.backend_addr,
        rpc_timeout_ms = config.rpc_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    // Backend RPC client (connects lazily on first call)
    let backend = Arc::new(RpcTaskBackend::new(&config)?);
    let state = AppState::new(backend, config.bearer_token.clone());
    let router = create_router(state);

    let listener = TcpListener::bind(config.http_addr).await?;
    let coordinator = ShutdownCoordinator::install();

    let token = coordinator.token();
    let mut serve_task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(token.cancelled_owned())
            .await
    });

    info!(addr = %config.http_addr, "Taskdock Gateway ready");

    // Wait for shutdown signal, then give in-flight requests the grace
    // period before aborting the server task.
    coordinator.requested().await;
    info!("Shutting down HTTP server...");

    let outcome = shutdown::drain(config.shutdown_grace, async {
        let _ = (&mut serve_task).await;
    })
    .await;

    match outcome {
        Outcome::StoppedGracefully => info!("HTTP server exited gracefully"),
        Outcome::ForcedStop => {
            warn!("HTTP server forced to stop");
            serve_task.abort();
        }
    }

    info!("Shutdown complete");
    Ok(())
}
