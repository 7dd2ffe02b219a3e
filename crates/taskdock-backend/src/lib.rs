// Copyright (C) 2025 Taskdock Contributors
// SPDX-License-Identifier: MIT
//! Taskdock Backend - Task Service
//!
//! The backend owns the business rules of the task resource:
//! - Identifier assignment on create
//! - Upsert semantics on update
//! - Read-then-delete with snapshot return
//! - Error taxonomy mapped onto RPC error responses
//!
//! Requests arrive over QUIC from the gateway; task documents persist in a
//! single collection of a document store (SQLite or PostgreSQL via sqlx).

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod shutdown;
pub mod store;
