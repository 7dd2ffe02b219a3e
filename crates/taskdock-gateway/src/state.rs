// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use crate::backend::TaskBackend;

/// State threaded through the router: the backend seam and the shared
/// secret for the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TaskBackend>,
    pub bearer_token: String,
}

impl AppState {
    pub fn new(backend: Arc<dyn TaskBackend>, bearer_token: impl Into<String>) -> Self {
        Self {
            backend,
            bearer_token: bearer_token.into(),
        }
    }
}
