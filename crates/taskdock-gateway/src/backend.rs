// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Backend access for the gateway.
//!
//! `TaskBackend` is the seam between HTTP handlers and the RPC layer: the
//! five task operations, nothing else. The production implementation talks
//! QUIC to the task backend with a bounded deadline per call; tests swap in
//! a mock.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument};

use taskdock_protocol::client::{ClientError, TaskClient, TaskClientConfig};
use taskdock_protocol::task_proto::{
    CODE_TASK_NOT_FOUND, ListTasksRequest, RpcRequest, RpcResponse, Task, TaskId,
    rpc_request::Request, rpc_response::Response,
};

use crate::config::Config;

/// Errors that can occur when calling the task backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested task does not exist.
    #[error("task with id {0} not found")]
    NotFound(String),

    /// The backend returned an error response.
    #[error("backend error [{code}]: {message}")]
    Remote { code: String, message: String },

    /// The call exceeded its deadline.
    #[error("backend request timed out after {0}ms")]
    Timeout(u64),

    /// The backend could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend answered with an unexpected message.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        BackendError::Connection(err.to_string())
    }
}

/// The five task operations the gateway delegates to the backend.
#[async_trait::async_trait]
pub trait TaskBackend: Send + Sync {
    async fn create_task(&self, task: Task) -> Result<Task, BackendError>;
    async fn get_task(&self, id: &str) -> Result<Task, BackendError>;
    async fn list_tasks(&self) -> Result<Vec<Task>, BackendError>;
    async fn update_task(&self, task: Task) -> Result<Task, BackendError>;
    async fn delete_task(&self, id: &str) -> Result<Task, BackendError>;
}

/// QUIC RPC implementation of [`TaskBackend`].
///
/// Every call runs under the configured deadline; an elapsed deadline is
/// reported as [`BackendError::Timeout`] regardless of whether the backend
/// eventually completes the work.
pub struct RpcTaskBackend {
    client: TaskClient,
    request_timeout: Duration,
}

impl RpcTaskBackend {
    /// Create a backend client from the gateway configuration.
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client_config = TaskClientConfig {
            server_addr: config.backend_addr,
            server_name: config.backend_server_name.clone(),
            dangerous_skip_cert_verification: config.skip_cert_verification,
            ..Default::default()
        };

        let client = TaskClient::new(client_config)?;

        Ok(Self {
            client,
            request_timeout: config.rpc_timeout,
        })
    }

    /// Send one request under the deadline and unwrap the response envelope.
    #[instrument(skip(self, request))]
    async fn send_request(&self, request: Request) -> Result<Response, BackendError> {
        let rpc_request = RpcRequest {
            request: Some(request),
        };

        let timeout_ms = self.request_timeout.as_millis() as u64;
        let rpc_response: RpcResponse =
            tokio::time::timeout(self.request_timeout, self.client.request(&rpc_request))
                .await
                .map_err(|_| BackendError::Timeout(timeout_ms))??;

        match rpc_response.response {
            Some(Response::Error(err)) => Err(BackendError::Remote {
                code: err.code,
                message: err.message,
            }),
            Some(response) => Ok(response),
            None => Err(BackendError::Protocol(
                "empty response from backend".to_string(),
            )),
        }
    }
}

/// Rewrite a remote TASK_NOT_FOUND into the structured NotFound variant for
/// the id the caller asked about.
fn not_found_for(id: &str, err: BackendError) -> BackendError {
    match err {
        BackendError::Remote { ref code, .. } if code == CODE_TASK_NOT_FOUND => {
            BackendError::NotFound(id.to_string())
        }
        other => other,
    }
}

#[async_trait::async_trait]
impl TaskBackend for RpcTaskBackend {
    #[instrument(skip(self, task), fields(title = %task.title))]
    async fn create_task(&self, task: Task) -> Result<Task, BackendError> {
        debug!("creating task");
        match self.send_request(Request::CreateTask(task)).await? {
            Response::Task(task) => Ok(task),
            _ => Err(BackendError::Protocol("expected Task response".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn get_task(&self, id: &str) -> Result<Task, BackendError> {
        debug!("fetching task");
        let request = Request::GetTask(TaskId { id: id.to_string() });
        match self
            .send_request(request)
            .await
            .map_err(|e| not_found_for(id, e))?
        {
            Response::Task(task) => Ok(task),
            _ => Err(BackendError::Protocol("expected Task response".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn list_tasks(&self) -> Result<Vec<Task>, BackendError> {
        debug!("listing tasks");
        match self
            .send_request(Request::ListTasks(ListTasksRequest {}))
            .await?
        {
            Response::TaskList(list) => Ok(list.tasks),
            _ => Err(BackendError::Protocol(
                "expected TaskList response".to_string(),
            )),
        }
    }

    #[instrument(skip(self, task), fields(id = %task.id))]
    async fn update_task(&self, task: Task) -> Result<Task, BackendError> {
        debug!("updating task");
        match self.send_request(Request::UpdateTask(task)).await? {
            Response::Task(task) => Ok(task),
            _ => Err(BackendError::Protocol("expected Task response".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: &str) -> Result<Task, BackendError> {
        debug!("deleting task");
        let request = Request::DeleteTask(TaskId { id: id.to_string() });
        match self
            .send_request(request)
            .await
            .map_err(|e| not_found_for(id, e))?
        {
            Response::Task(task) => Ok(task),
            _ => Err(BackendError::Protocol("expected Task response".to_string())),
        }
    }
}
