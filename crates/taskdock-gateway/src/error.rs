// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! HTTP error translation.
//!
//! Every failure path answers with a JSON body `{"error": <string>}`; the
//! status code is the machine-readable signal. Backend not-found errors map
//! to 404 with a message naming the requested id; everything else from the
//! backend (timeouts and transport failures included) maps to 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use taskdock_protocol::task_proto::CODE_VALIDATION_ERROR;

use crate::backend::BackendError;

/// JSON body for failure responses.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Auth { message: String },

    #[error("task with id {id} not found")]
    NotFound { id: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Auth { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(id) => Self::NotFound { id },
            BackendError::Remote { code, message } if code == CODE_VALIDATION_ERROR => {
                Self::Validation { message }
            }
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
