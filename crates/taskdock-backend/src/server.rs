// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! QUIC RPC server for the task backend.
//!
//! Accepts connections from the gateway and routes each stream's request to
//! the task handlers. Every stream carries exactly one request/response pair.
//!
//! The accept loops observe the shutdown token: once it fires, no new
//! connections or streams are accepted while in-flight request tasks (held
//! in the `TaskTracker`) run to completion or the grace period expires.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use taskdock_protocol::frame::Frame;
use taskdock_protocol::server::{ConnectionHandler, ServerError, StreamHandler, TaskServer};
use taskdock_protocol::task_proto::{
    CODE_EMPTY_REQUEST, RpcError, RpcRequest, RpcResponse, rpc_request::Request,
    rpc_response::Response,
};

use crate::handlers::{
    HandlerState, handle_create_task, handle_delete_task, handle_get_task, handle_list_tasks,
    handle_ping, handle_update_task,
};

/// Run the RPC server until the shutdown token fires.
#[instrument(skip(server, state, shutdown, requests))]
pub async fn run_server(
    server: Arc<TaskServer>,
    state: Arc<HandlerState>,
    shutdown: CancellationToken,
    requests: TaskTracker,
) -> Result<()> {
    info!(addr = %server.local_addr()?, "Task RPC server running");

    loop {
        tokio::select! {
            incoming = server.accept() => {
                let Some(incoming) = incoming else {
                    // Endpoint closed underneath us
                    break;
                };
                let state = state.clone();
                let shutdown = shutdown.clone();
                let requests = requests.clone();

                tokio::spawn(async move {
                    match incoming.await {
                        Ok(connection) => {
                            let conn = ConnectionHandler::new(connection);
                            handle_connection(conn, state, shutdown, requests).await;
                        }
                        Err(e) => {
                            warn!("failed to accept connection: {}", e);
                        }
                    }
                });
            }
            _ = shutdown.cancelled() => {
                info!("Task RPC server draining");
                break;
            }
        }
    }

    Ok(())
}

/// Handle a single connection: accept streams until the connection closes or
/// shutdown begins.
#[instrument(skip(conn, state, shutdown, requests), fields(remote = %conn.remote_address()))]
async fn handle_connection(
    conn: ConnectionHandler,
    state: Arc<HandlerState>,
    shutdown: CancellationToken,
    requests: TaskTracker,
) {
    debug!("New connection accepted");

    loop {
        tokio::select! {
            result = conn.accept_bi() => {
                match result {
                    Ok((send, recv)) => {
                        let state = state.clone();
                        requests.spawn(async move {
                            let stream = StreamHandler::new(send, recv);
                            if let Err(e) = handle_stream(stream, state).await {
                                error!("Stream error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        match &e {
                            ServerError::Connection(quinn::ConnectionError::ApplicationClosed(_))
                            | ServerError::Connection(quinn::ConnectionError::LocallyClosed) => {
                                debug!("connection closed");
                            }
                            _ => {
                                warn!("error accepting stream: {}", e);
                            }
                        }
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => {
                debug!("connection draining");
                break;
            }
        }
    }
}

/// Handle a single stream (one request/response).
async fn handle_stream(mut stream: StreamHandler, state: Arc<HandlerState>) -> Result<()> {
    let request_frame = stream.read_frame().await?;
    let rpc_request: RpcRequest = request_frame.decode()?;

    let request = match rpc_request.request {
        Some(req) => req,
        None => {
            warn!("Received empty RpcRequest");
            let response = RpcResponse {
                response: Some(Response::Error(RpcError {
                    code: CODE_EMPTY_REQUEST.to_string(),
                    message: "RpcRequest contained no request".to_string(),
                })),
            };
            stream.write_frame(&Frame::response(&response)?).await?;
            stream.finish()?;
            return Ok(());
        }
    };

    debug!(
        "Received task request: {:?}",
        std::mem::discriminant(&request)
    );

    // Route to the appropriate handler based on request type
    let response = match request {
        Request::CreateTask(task) => match handle_create_task(&state, task).await {
            Ok(task) => Response::Task(task),
            Err(e) => Response::Error(e.to_rpc_error()),
        },

        Request::GetTask(req) => match handle_get_task(&state, req).await {
            Ok(task) => Response::Task(task),
            Err(e) => Response::Error(e.to_rpc_error()),
        },

        Request::ListTasks(req) => match handle_list_tasks(&state, req).await {
            Ok(list) => Response::TaskList(list),
            Err(e) => Response::Error(e.to_rpc_error()),
        },

        Request::UpdateTask(task) => match handle_update_task(&state, task).await {
            Ok(task) => Response::Task(task),
            Err(e) => Response::Error(e.to_rpc_error()),
        },

        Request::DeleteTask(req) => match handle_delete_task(&state, req).await {
            Ok(task) => Response::Task(task),
            Err(e) => Response::Error(e.to_rpc_error()),
        },

        Request::Ping(req) => match handle_ping(&state, req).await {
            Ok(resp) => Response::Ping(resp),
            Err(e) => Response::Error(e.to_rpc_error()),
        },
    };

    let rpc_response = RpcResponse {
        response: Some(response),
    };
    stream.write_frame(&Frame::response(&rpc_response)?).await?;
    stream.finish()?;

    Ok(())
}
