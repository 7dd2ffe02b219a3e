//! SQLite-backed store implementation.

use std::path::Path;

use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::types::Json;

use super::{StoreError, TaskStore, doc_id};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/sqlite");

/// SQLite-backed task store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create and initialize a SQLite store from a database file path.
    ///
    /// Creates parent directories and the database file as needed, connects
    /// with sensible defaults, and runs all migrations.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::query("create_dir", e))?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());
        Self::from_url(&url).await
    }

    /// Create and initialize a SQLite store from a connection URL.
    pub async fn from_url(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| StoreError::query("connect", e))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::query("migrate", e))?;

        Ok(Self { pool })
    }

    /// Create an in-memory store for tests.
    ///
    /// Capped at one connection: each connection to `sqlite::memory:` would
    /// otherwise get its own private database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::query("connect", e))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::query("migrate", e))?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl TaskStore for SqliteStore {
    async fn insert(&self, doc: &Value) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tasks (id, doc) VALUES (?, ?)")
            .bind(doc_id(doc))
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query("insert", e))?;

        Ok(())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<Json<Value>> =
            sqlx::query_scalar("SELECT doc FROM tasks WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::query("find_one", e))?;

        Ok(row.map(|Json(doc)| doc))
    }

    async fn find_all(&self) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<Json<Value>> = sqlx::query_scalar("SELECT doc FROM tasks")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::query("find_all", e))?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn upsert(&self, id: &str, doc: &Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, doc) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET doc = excluded.doc
            "#,
        )
        .bind(id)
        .bind(Json(doc))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::query("upsert", e))?;

        Ok(())
    }

    async fn delete_one(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query("delete_one", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let row: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::query("health_check", e))?;

        Ok(row.0 == 1)
    }
}
