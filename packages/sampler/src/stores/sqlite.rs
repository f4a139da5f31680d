//! SQLite record store.
//!
//! Each record is stored as a JSON document next to the columns needed for
//! duplicate checks and progress counts.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{Result, SamplerError};
use crate::traits::store::RecordStore;
use crate::types::record::{Record, RecordId};
use crate::types::taxonomy::CategoryKey;

/// SQLite-backed record store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and run migrations.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://sampler.db?mode=rwc` - File database, created if missing
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// In-memory store on a single connection (each connection would
    /// otherwise see its own empty database).
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                document TEXT NOT NULL,
                scraped_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_category ON records(category);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        debug!("SQLite migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: String,
    document: String,
}

impl RecordRow {
    fn into_record(self) -> Result<Record> {
        serde_json::from_str(&self.document).map_err(|e| {
            SamplerError::Storage(format!("Invalid record JSON for {}: {}", self.id, e).into())
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn exists(&self, id: &RecordId) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM records WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;
        Ok(row.is_some())
    }

    async fn insert(&self, record: &Record) -> Result<bool> {
        let document = serde_json::to_string(record)?;
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO records (id, name, category, document, scraped_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.name)
        .bind(record.category.to_string())
        .bind(&document)
        .bind(record.scraped_at.to_rfc3339())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn load_progress(&self) -> Result<HashMap<CategoryKey, usize>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT category, COUNT(*) FROM records GROUP BY category")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        let mut progress = HashMap::new();
        for (category, count) in rows {
            match category.parse::<CategoryKey>() {
                Ok(key) => {
                    progress.insert(key, count.max(0) as usize);
                }
                Err(e) => warn!(category = %category, error = %e, "Skipping unknown stored category"),
            }
        }
        Ok(progress)
    }

    async fn clear(&self) -> Result<usize> {
        let result = sqlx::query("DELETE FROM records")
            .execute(&self.pool)
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;
        Ok(result.rows_affected() as usize)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>("SELECT id, document FROM records WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        row.map(RecordRow::into_record).transpose()
    }

    async fn list(&self) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, RecordRow>("SELECT id, document FROM records ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    async fn replace(&self, record: &Record) -> Result<bool> {
        let document = serde_json::to_string(record)?;

        let result = sqlx::query(
            "UPDATE records SET name = ?, category = ?, document = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&record.name)
        .bind(record.category.to_string())
        .bind(&document)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(record.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SamplerError::Storage(e.to_string().into()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn count(&self) -> Result<usize> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SamplerError::Storage(e.to_string().into()))?;
        Ok(count.0.max(0) as usize)
    }
}
