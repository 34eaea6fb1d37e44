use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use super::CallRecorder;
use crate::error::Result;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS api_calls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        endpoint TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_api_calls_endpoint ON api_calls(endpoint)",
    "CREATE INDEX IF NOT EXISTS idx_api_calls_created_at ON api_calls(created_at)",
];

/// Call tracker backed by a SQLite file.
///
/// Inserts from concurrent fetches go through the connection pool; SQLite
/// serializes the writes and `busy_timeout` absorbs lock contention.
#[derive(Clone)]
pub struct SqliteCallTracker {
    pool: SqlitePool,
}

impl SqliteCallTracker {
    /// Opens (creating if needed) the database at `db_path` and ensures the schema.
    pub async fn open(db_path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!(path = db_path, "call tracker ready");
        Ok(Self { pool })
    }

    pub async fn total_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM api_calls")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Call counts grouped by endpoint.
    pub async fn count_by_endpoint(&self) -> Result<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT endpoint, COUNT(*) AS call_count FROM api_calls GROUP BY endpoint",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// Calls recorded since midnight UTC.
    pub async fn count_today(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM api_calls WHERE date(created_at) = date('now')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CallRecorder for SqliteCallTracker {
    async fn record(&self, identifier: &str) -> Result<()> {
        sqlx::query("INSERT INTO api_calls (endpoint) VALUES (?)")
            .bind(identifier)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
