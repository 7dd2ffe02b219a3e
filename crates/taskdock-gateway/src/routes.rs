// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Routing definitions for the task API.
//!
//! `/health` stays outside the auth layer so orchestrators can probe the
//! process without credentials; every `/tasks` route sits behind it.

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let tasks = Router::new()
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(tasks)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
