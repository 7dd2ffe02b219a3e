// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! HTTP handlers for the task resource.
//!
//! Each handler binds the payload, validates it locally, delegates to the
//! backend seam, and translates the outcome into an HTTP response. Local
//! rejections (validation, malformed bodies) never reach the backend.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use taskdock_protocol::task_proto::Task;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate::validate_task;

/// Liveness response body.
#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe. No authentication; orchestrators hit this without
/// credentials.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /tasks
#[instrument(skip(state, body))]
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Task>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(task) = body.map_err(|e| ApiError::validation(e.body_text()))?;
    validate_task(&task)?;

    let created = state.backend.create_task(task).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /tasks
#[instrument(skip(state))]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .backend
        .list_tasks()
        .await
        .map_err(|_| ApiError::internal("failed to list tasks"))?;

    // Always an array, never null
    Ok(Json(tasks))
}

/// GET /tasks/{id}
#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::validation("task ID is required"));
    }

    let task = state.backend.get_task(&id).await.map_err(|e| match e {
        crate::backend::BackendError::NotFound(id) => ApiError::not_found(id),
        _ => ApiError::internal("failed to get task"),
    })?;

    Ok(Json(task))
}

/// PUT /tasks/{id}
#[instrument(skip(state, body))]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::validation("task ID is required"));
    }

    let Json(mut task) = body.map_err(|e| ApiError::validation(e.body_text()))?;
    // The path owns the identifier; whatever the body carried is discarded.
    task.id = id;
    validate_task(&task)?;

    let updated = state.backend.update_task(task).await?;
    Ok(Json(updated))
}

/// DELETE /tasks/{id}
#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    if id.is_empty() {
        return Err(ApiError::validation("task ID is required"));
    }

    let deleted = state.backend.delete_task(&id).await.map_err(|e| match e {
        crate::backend::BackendError::NotFound(id) => ApiError::not_found(id),
        _ => ApiError::internal("failed to delete task"),
    })?;

    Ok(Json(deleted))
}
