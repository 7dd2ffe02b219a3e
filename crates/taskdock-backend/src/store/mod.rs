//! Store adapters for the task document collection.
//!
//! The store is mechanical: it moves raw JSON documents in and out of a
//! single `tasks` collection keyed by `id`. No validation, no identifier
//! generation; that is the service layer's job.

pub mod postgres;
pub mod sqlite;

pub use self::postgres::PostgresStore;
pub use self::sqlite::SqliteStore;

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store error during '{operation}': {details}")]
    Query { operation: String, details: String },
}

impl StoreError {
    pub(crate) fn query(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Query {
            operation: operation.to_string(),
            details: err.to_string(),
        }
    }
}

/// Minimal document-store contract consumed by the task handlers.
///
/// One logical collection of task documents keyed by `id`. Documents are
/// opaque JSON at this layer; a document's `id` field and the row key are
/// kept in sync by the callers' contract (every document carries its id).
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert one document. The row key is taken from the document's `id`
    /// field.
    async fn insert(&self, doc: &Value) -> Result<(), StoreError>;

    /// Fetch the document with the given id, if any.
    async fn find_one(&self, id: &str) -> Result<Option<Value>, StoreError>;

    /// Fetch every document in the collection.
    async fn find_all(&self) -> Result<Vec<Value>, StoreError>;

    /// Insert the document under `id`, or replace the existing one.
    async fn upsert(&self, id: &str, doc: &Value) -> Result<(), StoreError>;

    /// Delete the document with the given id. Returns whether a row was
    /// actually removed.
    async fn delete_one(&self, id: &str) -> Result<bool, StoreError>;

    /// Cheap connectivity probe for liveness reporting.
    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Row key for a document: its `id` field, or empty when absent.
///
/// The store does not reject key-less documents; persisting one is a caller
/// bug that shows up as an empty-keyed row rather than a store error.
pub(crate) fn doc_id(doc: &Value) -> &str {
    doc.get("id").and_then(Value::as_str).unwrap_or_default()
}
