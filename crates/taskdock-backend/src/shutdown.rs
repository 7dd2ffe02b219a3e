// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Graceful shutdown coordination.
//!
//! The coordinator moves through `Running → Draining → {StoppedGracefully,
//! ForcedStop}`: a termination signal cancels the token (Draining: accept
//! loops stop taking new work), then the drain future races a bounded grace
//! timer.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// In-flight work finished before the grace timer fired.
    StoppedGracefully,
    /// The grace timer fired first; remaining work must be aborted.
    ForcedStop,
}

/// Shutdown coordinator driven by process termination signals.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Install the signal listeners. The returned coordinator's token is
    /// cancelled on SIGINT or SIGTERM.
    pub fn install() -> Self {
        let token = CancellationToken::new();

        let signal_token = token.clone();
        tokio::spawn(async move {
            wait_for_termination().await;
            signal_token.cancel();
        });

        Self { token }
    }

    /// A token observed by accept loops; cancelled when shutdown begins.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait until shutdown has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }
}

/// Race the drain future against the grace timer.
pub async fn drain(grace: Duration, drained: impl Future<Output = ()>) -> Outcome {
    match tokio::time::timeout(grace, drained).await {
        Ok(()) => Outcome::StoppedGracefully,
        Err(_) => Outcome::ForcedStop,
    }
}

/// Wait for SIGINT or, on unix, SIGTERM.
async fn wait_for_termination() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
