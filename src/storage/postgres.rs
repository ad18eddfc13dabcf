use crate::models::LinkRecord;
use crate::storage::{LinkStore, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl LinkStore for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id BIGSERIAL PRIMARY KEY,
                original_url TEXT NOT NULL,
                short_code TEXT UNIQUE,
                created_at BIGINT NOT NULL,
                clicks BIGINT NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_original_url ON urls(original_url)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create_with_id(&self, original_url: &str) -> StorageResult<LinkRecord> {
        let created_at = chrono::Utc::now().timestamp();

        let record = sqlx::query_as::<_, LinkRecord>(
            r#"
            INSERT INTO urls (original_url, created_at)
            VALUES ($1, $2)
            RETURNING id, short_code, original_url, created_at, clicks
            "#,
        )
        .bind(original_url)
        .bind(created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn set_short_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET short_code = $1
            WHERE id = $2 AND (short_code IS NULL OR short_code = $1)
            "#,
        )
        .bind(short_code)
        .bind(id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::from_sqlx(e, short_code))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM urls WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        match exists {
            None => Err(StorageError::NotFound),
            Some(_) => Err(StorageError::CodeAlreadySet { id }),
        }
    }

    async fn create_with_alias(
        &self,
        original_url: &str,
        short_code: &str,
    ) -> StorageResult<LinkRecord> {
        let created_at = chrono::Utc::now().timestamp();

        let record = sqlx::query_as::<_, LinkRecord>(
            r#"
            INSERT INTO urls (original_url, short_code, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (short_code) DO NOTHING
            RETURNING id, short_code, original_url, created_at, clicks
            "#,
        )
        .bind(original_url)
        .bind(short_code)
        .bind(created_at)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::from_sqlx(e, short_code))?;

        record.ok_or_else(|| StorageError::AliasTaken(short_code.to_string()))
    }

    async fn find_by_code(&self, short_code: &str) -> StorageResult<LinkRecord> {
        let record = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT id, short_code, original_url, created_at, clicks
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        record.ok_or(StorageError::NotFound)
    }

    async fn increment_clicks(&self, id: i64) -> StorageResult<i64> {
        let clicks = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE urls
            SET clicks = clicks + 1
            WHERE id = $1
            RETURNING clicks
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        clicks.ok_or(StorageError::NotFound)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
