// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Task backend RPC address
    pub backend_addr: SocketAddr,
    /// Server name for TLS verification of the backend
    pub backend_server_name: String,
    /// Skip TLS certificate verification for the backend (development only)
    pub skip_cert_verification: bool,
    /// Shared secret for the bearer auth check
    pub bearer_token: String,
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Deadline for each backend RPC call
    pub rpc_timeout: Duration,
    /// Grace period for draining in-flight requests on shutdown
    pub shutdown_grace: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `TASKDOCK_BACKEND_ADDR`: task backend address (e.g. "127.0.0.1:50051")
    /// - `TASKDOCK_BEARER_TOKEN`: shared secret for the auth check (non-empty)
    ///
    /// Optional (with defaults):
    /// - `TASKDOCK_SERVER_NAME`: backend TLS server name (default: "localhost")
    /// - `TASKDOCK_SKIP_CERT_VERIFICATION`: skip backend TLS verification (default: "false")
    /// - `TASKDOCK_HTTP_PORT`: HTTP listen port (default: 8080)
    /// - `TASKDOCK_RPC_TIMEOUT_MS`: per-call backend deadline in ms (default: 2000)
    /// - `TASKDOCK_SHUTDOWN_GRACE_MS`: shutdown grace period in ms (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_addr = std::env::var("TASKDOCK_BACKEND_ADDR")
            .map_err(|_| ConfigError::Missing("TASKDOCK_BACKEND_ADDR"))?
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("TASKDOCK_BACKEND_ADDR", "must be a socket address")
            })?;

        let bearer_token = std::env::var("TASKDOCK_BEARER_TOKEN")
            .map_err(|_| ConfigError::Missing("TASKDOCK_BEARER_TOKEN"))?;
        if bearer_token.is_empty() {
            return Err(ConfigError::Invalid(
                "TASKDOCK_BEARER_TOKEN",
                "must not be empty",
            ));
        }

        let backend_server_name =
            std::env::var("TASKDOCK_SERVER_NAME").unwrap_or_else(|_| "localhost".to_string());

        let skip_cert_verification = std::env::var("TASKDOCK_SKIP_CERT_VERIFICATION")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let http_port: u16 = std::env::var("TASKDOCK_HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("TASKDOCK_HTTP_PORT", "must be a valid port number")
            })?;

        let rpc_timeout_ms: u64 = std::env::var("TASKDOCK_RPC_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("TASKDOCK_RPC_TIMEOUT_MS", "must be a positive integer")
            })?;

        let shutdown_grace_ms: u64 = std::env::var("TASKDOCK_SHUTDOWN_GRACE_MS")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("TASKDOCK_SHUTDOWN_GRACE_MS", "must be a positive integer")
            })?;

        Ok(Self {
            backend_addr,
            backend_server_name,
            skip_cert_verification,
            bearer_token,
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
            rpc_timeout: Duration::from_millis(rpc_timeout_ms),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set env vars for a test and restore them after
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
                unsafe {
                    match value {
                        Some(v) => env::set_var(&key, v),
                        None => env::remove_var(&key),
                    }
                }
            }
        }
    }

    fn set_required(guard: &mut EnvGuard) {
        guard.set("TASKDOCK_BACKEND_ADDR", "127.0.0.1:50051");
        guard.set("TASKDOCK_BEARER_TOKEN", "secret");
        guard.remove("TASKDOCK_SERVER_NAME");
        guard.remove("TASKDOCK_SKIP_CERT_VERIFICATION");
        guard.remove("TASKDOCK_HTTP_PORT");
        guard.remove("TASKDOCK_RPC_TIMEOUT_MS");
        guard.remove("TASKDOCK_SHUTDOWN_GRACE_MS");
    }

    #[test]
    fn test_config_from_env_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);

        let config = Config::from_env().unwrap();

        assert_eq!(config.backend_addr, "127.0.0.1:50051".parse().unwrap());
        assert_eq!(config.bearer_token, "secret");
        assert_eq!(config.backend_server_name, "localhost");
        assert!(!config.skip_cert_verification);
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.rpc_timeout, Duration::from_secs(2));
        assert_eq!(config.shutdown_grace, Duration::from_secs(10));
    }

    #[test]
    fn test_config_from_env_all_custom() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("TASKDOCK_SERVER_NAME", "backend.internal");
        guard.set("TASKDOCK_SKIP_CERT_VERIFICATION", "true");
        guard.set("TASKDOCK_HTTP_PORT", "9090");
        guard.set("TASKDOCK_RPC_TIMEOUT_MS", "500");
        guard.set("TASKDOCK_SHUTDOWN_GRACE_MS", "3000");

        let config = Config::from_env().unwrap();

        assert_eq!(config.backend_server_name, "backend.internal");
        assert!(config.skip_cert_verification);
        assert_eq!(config.http_addr.port(), 9090);
        assert_eq!(config.rpc_timeout, Duration::from_millis(500));
        assert_eq!(config.shutdown_grace, Duration::from_secs(3));
    }

    #[test]
    fn test_config_missing_backend_addr() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.remove("TASKDOCK_BACKEND_ADDR");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TASKDOCK_BACKEND_ADDR")));
    }

    #[test]
    fn test_config_invalid_backend_addr() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("TASKDOCK_BACKEND_ADDR", "not-an-address");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid("TASKDOCK_BACKEND_ADDR", _)
        ));
    }

    #[test]
    fn test_config_missing_bearer_token() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.remove("TASKDOCK_BEARER_TOKEN");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TASKDOCK_BEARER_TOKEN")));
    }

    #[test]
    fn test_config_empty_bearer_token() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("TASKDOCK_BEARER_TOKEN", "");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid("TASKDOCK_BEARER_TOKEN", _)
        ));
    }

    #[test]
    fn test_config_invalid_http_port() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("TASKDOCK_HTTP_PORT", "not_a_number");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("TASKDOCK_HTTP_PORT", _)));
    }

    #[test]
    fn test_config_invalid_rpc_timeout() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();
        set_required(&mut guard);
        guard.set("TASKDOCK_RPC_TIMEOUT_MS", "soon");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid("TASKDOCK_RPC_TIMEOUT_MS", _)
        ));
    }
}
