// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Bearer-token authentication middleware.
//!
//! Applied to every route except the liveness endpoint. The token must
//! exactly equal the configured shared secret; otherwise the request is
//! answered with 401 before any handler runs.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Reject requests without a valid `Authorization: Bearer <token>` header.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some(token) = header.strip_prefix("Bearer ") else {
        return ApiError::auth("Missing or invalid Authorization header").into_response();
    };

    if token != state.bearer_token {
        return ApiError::auth("Invalid token").into_response();
    }

    next.run(request).await
}
