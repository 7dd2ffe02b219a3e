// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Taskdock Backend - Task Service
//!
//! QUIC RPC server implementing the five task CRUD operations against the
//! document store, plus a liveness probe for orchestrator checks.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use taskdock_backend::config::Config;
use taskdock_backend::handlers::HandlerState;
use taskdock_backend::server;
use taskdock_backend::shutdown::{self, Outcome, ShutdownCoordinator};
use taskdock_backend::store::{PostgresStore, SqliteStore, TaskStore};
use taskdock_protocol::server::TaskServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskdock_backend=info".parse().unwrap()),
        )
        .init();

    info!("Starting Taskdock Backend");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        rpc_addr = %config.rpc_addr,
        grace_ms = config.shutdown_grace.as_millis() as u64,
        "Configuration loaded"
    );

    // Connect to the document store and run migrations
    info!("Connecting to store...");
    let store: Arc<dyn TaskStore> = if config.database_url.starts_with("sqlite:") {
        Arc::new(SqliteStore::from_url(&config.database_url).await?)
    } else {
        Arc::new(PostgresStore::connect(&config.database_url).await?)
    };

    // Verify connection
    if !store.health_check().await? {
        anyhow::bail!("store health check failed");
    }
    info!("Store connection established");

    let state = Arc::new(HandlerState::new(store));

    // Start the RPC server
    let server = Arc::new(TaskServer::localhost(config.rpc_addr)?);
    let coordinator = ShutdownCoordinator::install();
    let requests = TaskTracker::new();

    let run = tokio::spawn(server::run_server(
        server.clone(),
        state,
        coordinator.token(),
        requests.clone(),
    ));

    info!(addr = %config.rpc_addr, "Taskdock Backend ready");

    // Wait for shutdown signal, then drain in-flight requests
    coordinator.requested().await;
    info!("Shutting down Task RPC server...");

    requests.close();
    match shutdown::drain(config.shutdown_grace, requests.wait()).await {
        Outcome::StoppedGracefully => info!("Task RPC server exited gracefully"),
        Outcome::ForcedStop => warn!("Task RPC server forced to stop"),
    }

    server.close();
    let _ = run.await;

    info!("Shutdown complete");
    Ok(())
}
