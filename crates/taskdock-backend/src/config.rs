// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Task backend configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL or SQLite connection URL
    pub database_url: String,
    /// QUIC RPC server address
    pub rpc_addr: SocketAddr,
    /// Grace period for draining in-flight requests on shutdown
    pub shutdown_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `TASKDOCK_DATABASE_URL`: PostgreSQL or SQLite connection string
    ///
    /// Optional (with defaults):
    /// - `TASKDOCK_RPC_PORT`: RPC server port (default: 50051)
    /// - `TASKDOCK_SHUTDOWN_GRACE_MS`: shutdown grace period in ms (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("TASKDOCK_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("TASKDOCK_DATABASE_URL"))?;

        let rpc_port: u16 = std::env::var("TASKDOCK_RPC_PORT")
            .unwrap_or_else(|_| "50051".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TASKDOCK_RPC_PORT", "must be a valid port number"))?;

        let shutdown_grace_ms: u64 = std::env::var("TASKDOCK_SHUTDOWN_GRACE_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("TASKDOCK_SHUTDOWN_GRACE_MS", "must be a positive integer")
            })?;

        Ok(Self {
            database_url,
            rpc_addr: SocketAddr::from(([0, 0, 0, 0], rpc_port)),
            shutdown_grace: Duration::from_millis(shutdown_grace_ms),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
