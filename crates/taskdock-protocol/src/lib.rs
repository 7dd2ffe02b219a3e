// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Taskdock Protocol - QUIC + Protobuf communication layer
//!
//! This crate provides the wire protocol between the HTTP gateway and the
//! task backend service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   taskdock-protocol                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RPC Layer: one request/response per stream                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Serialization: Protobuf (prost)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Transport: QUIC (quinn)                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use taskdock_protocol::{TaskClient, task_proto};
//!
//! let client = TaskClient::localhost()?;
//! client.connect().await?;
//!
//! let request = task_proto::RpcRequest {
//!     request: Some(task_proto::rpc_request::Request::GetTask(
//!         task_proto::TaskId { id: "abc123".to_string() },
//!     )),
//! };
//!
//! let response: task_proto::RpcResponse = client.request(&request).await?;
//! ```

pub mod client;
pub mod frame;
pub mod server;

/// Protobuf messages for the task RPC protocol.
///
/// The message set is small and fixed, so the structs are written directly
/// with prost derives instead of being generated from a `.proto` file.
/// Field tags are part of the wire contract and must not be reassigned.
pub mod task_proto {
    /// A task document. Doubles as the HTTP JSON body, hence the serde
    /// derives; missing JSON fields default to empty strings (proto3
    /// semantics).
    #[derive(Clone, PartialEq, ::prost::Message, serde::Serialize, serde::Deserialize)]
    #[serde(default)]
    pub struct Task {
        /// Server-assigned identifier (UUID v4 text).
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub title: String,
        #[prost(string, tag = "3")]
        pub description: String,
    }

    /// Identifier-only request for Get/Delete.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TaskId {
        #[prost(string, tag = "1")]
        pub id: String,
    }

    /// Empty request for List.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListTasksRequest {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TaskList {
        #[prost(message, repeated, tag = "1")]
        pub tasks: Vec<Task>,
    }

    /// Empty request for the liveness probe.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PingRequest {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PingResponse {
        #[prost(bool, tag = "1")]
        pub healthy: bool,
        #[prost(string, tag = "2")]
        pub version: String,
        #[prost(int64, tag = "3")]
        pub uptime_ms: i64,
    }

    /// Error carried in an RPC response. `code` is a stable machine-readable
    /// identifier; `message` is diagnostic text.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RpcError {
        #[prost(string, tag = "1")]
        pub code: String,
        #[prost(string, tag = "2")]
        pub message: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RpcRequest {
        #[prost(oneof = "rpc_request::Request", tags = "1, 2, 3, 4, 5, 6")]
        pub request: Option<rpc_request::Request>,
    }

    pub mod rpc_request {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Request {
            #[prost(message, tag = "1")]
            CreateTask(super::Task),
            #[prost(message, tag = "2")]
            GetTask(super::TaskId),
            #[prost(message, tag = "3")]
            ListTasks(super::ListTasksRequest),
            #[prost(message, tag = "4")]
            UpdateTask(super::Task),
            #[prost(message, tag = "5")]
            DeleteTask(super::TaskId),
            #[prost(message, tag = "6")]
            Ping(super::PingRequest),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RpcResponse {
        #[prost(oneof = "rpc_response::Response", tags = "1, 2, 3, 4")]
        pub response: Option<rpc_response::Response>,
    }

    pub mod rpc_response {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Response {
            #[prost(message, tag = "1")]
            Task(super::Task),
            #[prost(message, tag = "2")]
            TaskList(super::TaskList),
            #[prost(message, tag = "3")]
            Error(super::RpcError),
            #[prost(message, tag = "4")]
            Ping(super::PingResponse),
        }
    }

    /// Error code for a task lookup that matched nothing.
    pub const CODE_TASK_NOT_FOUND: &str = "TASK_NOT_FOUND";
    /// Error code for store or serialization failures.
    pub const CODE_DATABASE_ERROR: &str = "DATABASE_ERROR";
    /// Error code for rejected input.
    pub const CODE_VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// Error code for an RpcRequest with no request set.
    pub const CODE_EMPTY_REQUEST: &str = "EMPTY_REQUEST";
}

// Re-export main types
pub use client::{ClientError, TaskClient, TaskClientConfig};
pub use frame::{Frame, FrameError, FramedStream, MessageType};
pub use server::{ConnectionHandler, ServerError, StreamHandler, TaskServer, TaskServerConfig};
