//! PostgreSQL-backed store implementation.

use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{StoreError, TaskStore, doc_id};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/postgres");

/// PostgreSQL-backed task store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the given database URL and run migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
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
impl TaskStore for PostgresStore {
    async fn insert(&self, doc: &Value) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tasks (id, doc) VALUES ($1, $2)")
            .bind(doc_id(doc))
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::query("insert", e))?;

        Ok(())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<Json<Value>> =
            sqlx::query_scalar("SELECT doc FROM tasks WHERE id = $1")
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
            INSERT INTO tasks (id, doc) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET doc = excluded.doc
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
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
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
