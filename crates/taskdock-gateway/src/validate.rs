// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Task payload validation.
//!
//! Runs in the gateway before any backend call; a rejected payload never
//! reaches the RPC layer.

use taskdock_protocol::task_proto::Task;

use crate::error::ApiError;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Validate a task payload for create and update requests.
pub fn validate_task(task: &Task) -> Result<(), ApiError> {
    if task.title.is_empty() {
        return Err(ApiError::validation("title is required"));
    }
    if task.title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    if task.description.is_empty() {
        return Err(ApiError::validation("description is required"));
    }
    if task.description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ApiError::validation(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}
