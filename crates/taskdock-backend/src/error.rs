// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Error types for taskdock-backend.
//!
//! Provides a unified error type that maps to RPC error responses.

use std::fmt;

use taskdock_protocol::task_proto::{CODE_DATABASE_ERROR, CODE_TASK_NOT_FOUND, RpcError};

use crate::store::StoreError;

/// Result type using BackendError
pub type Result<T> = std::result::Result<T, BackendError>;

/// Backend errors that can occur during request processing.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum BackendError {
    /// No task with the requested id exists.
    TaskNotFound {
        /// The task id that was not found.
        id: String,
    },

    /// Store operation failed.
    DatabaseError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

impl BackendError {
    /// Convert this error to an RpcError for protocol responses.
    pub fn to_rpc_error(&self) -> RpcError {
        RpcError {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }

    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TaskNotFound { .. } => CODE_TASK_NOT_FOUND,
            Self::DatabaseError { .. } => CODE_DATABASE_ERROR,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskNotFound { id } => {
                write!(f, "task with id {} not found", id)
            }
            Self::DatabaseError { operation, details } => {
                write!(f, "database error during '{}': {}", operation, details)
            }
        }
    }
}

impl std::error::Error for BackendError {}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Query { operation, details } => {
                BackendError::DatabaseError { operation, details }
            }
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::DatabaseError {
            operation: "json".to_string(),
            details: err.to_string(),
        }
    }
}
