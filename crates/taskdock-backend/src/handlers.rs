// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! RPC handlers for the task service.
//!
//! These handlers own the business rules of the task resource:
//! - Identifier assignment on create
//! - Upsert semantics on update
//! - Read-then-delete with snapshot return
//! - Partial-success decoding during list

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use taskdock_protocol::task_proto::{
    ListTasksRequest, PingRequest, PingResponse, Task, TaskId, TaskList,
};

use crate::error::{BackendError, Result};
use crate::store::TaskStore;

/// Shared state for the task handlers.
///
/// Holds the store plus server metadata for the liveness probe.
pub struct HandlerState {
    /// Document store for task documents.
    pub store: Arc<dyn TaskStore>,
    /// When the server started (for uptime calculation).
    pub start_time: std::time::Instant,
    /// Server version string.
    pub version: String,
}

impl HandlerState {
    /// Create a new handler state with the given store.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Get the server uptime in milliseconds.
    pub fn uptime_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }
}

// ============================================================================
// Create
// ============================================================================

/// Handle task creation.
///
/// Assigns a fresh UUID, overwriting any client-supplied id, then inserts
/// the document. Duplicate-id failures cannot occur because the id is
/// generated per call.
#[instrument(skip(state, task), fields(title = %task.title))]
pub async fn handle_create_task(state: &HandlerState, mut task: Task) -> Result<Task> {
    task.id = Uuid::new_v4().to_string();

    let doc = serde_json::to_value(&task)?;
    state.store.insert(&doc).await?;

    debug!(id = %task.id, "task created");
    Ok(task)
}

// ============================================================================
// Get
// ============================================================================

/// Handle a single-task lookup. Fails with `TaskNotFound` when no document
/// matches the id.
#[instrument(skip(state, request), fields(id = %request.id))]
pub async fn handle_get_task(state: &HandlerState, request: TaskId) -> Result<Task> {
    let doc = state
        .store
        .find_one(&request.id)
        .await?
        .ok_or_else(|| BackendError::TaskNotFound {
            id: request.id.clone(),
        })?;

    Ok(serde_json::from_value(doc)?)
}

// ============================================================================
// List
// ============================================================================

/// Handle a full-collection listing.
///
/// A document that fails to decode is logged and skipped; the remaining
/// documents are still returned. The response always carries a list, empty
/// when nothing decodes.
#[instrument(skip(state, _request))]
pub async fn handle_list_tasks(
    state: &HandlerState,
    _request: ListTasksRequest,
) -> Result<TaskList> {
    let docs = state.store.find_all().await?;

    let mut tasks = Vec::with_capacity(docs.len());
    for doc in docs {
        match serde_json::from_value::<Task>(doc.clone()) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                warn!(id = ?doc.get("id"), error = %e, "skipping task document that failed to decode");
            }
        }
    }

    Ok(TaskList { tasks })
}

// ============================================================================
// Update
// ============================================================================

/// Handle a task update as an upsert keyed on the task id: replace the
/// existing document, or create one when the id was never seen. An id with
/// no prior document is the intended insert case, not an error.
#[instrument(skip(state, task), fields(id = %task.id))]
pub async fn handle_update_task(state: &HandlerState, task: Task) -> Result<Task> {
    let doc = serde_json::to_value(&task)?;
    state.store.upsert(&task.id, &doc).await?;

    debug!("task upserted");
    Ok(task)
}

// ============================================================================
// Delete
// ============================================================================

/// Handle a task deletion.
///
/// Reads the document first to return the pre-delete snapshot; absent id
/// fails with `TaskNotFound` and no delete is issued. If a concurrent caller
/// removes the document between the read and the delete, the delete still
/// succeeds with the observed snapshot.
#[instrument(skip(state, request), fields(id = %request.id))]
pub async fn handle_delete_task(state: &HandlerState, request: TaskId) -> Result<Task> {
    let doc = state
        .store
        .find_one(&request.id)
        .await?
        .ok_or_else(|| BackendError::TaskNotFound {
            id: request.id.clone(),
        })?;

    let snapshot: Task = serde_json::from_value(doc)?;

    let removed = state.store.delete_one(&request.id).await?;
    if !removed {
        // A concurrent delete won the race after our read.
        debug!("delete removed no rows");
    }

    Ok(snapshot)
}

// ============================================================================
// Ping
// ============================================================================

/// Handle the liveness probe: store connectivity, version and uptime.
#[instrument(skip(state, _request))]
pub async fn handle_ping(state: &HandlerState, _request: PingRequest) -> Result<PingResponse> {
    let healthy = state.store.health_check().await.unwrap_or(false);

    Ok(PingResponse {
        healthy,
        version: state.version.clone(),
        uptime_ms: state.uptime_ms(),
    })
}
