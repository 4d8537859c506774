//! Sync audit log repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::{error::AppResult, models::sync::SyncAuditEntry};

#[derive(Clone)]
pub struct SyncLogRepository {
    pool: Pool<Sqlite>,
}

impl SyncLogRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Append an audit entry, keeping only the most recent `keep` entries.
    pub async fn append(
        &self,
        synced_at: DateTime<Utc>,
        records_count: i64,
        success: bool,
        message: &str,
        keep: i64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sync_log (synced_at, records_count, success, message) VALUES (?, ?, ?, ?)",
        )
        .bind(synced_at)
        .bind(records_count)
        .bind(success)
        .bind(message)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM sync_log WHERE id NOT IN (
                SELECT id FROM sync_log ORDER BY id DESC LIMIT ?
            )
            "#,
        )
        .bind(keep)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn last(&self) -> AppResult<Option<SyncAuditEntry>> {
        let entry = sqlx::query_as::<_, SyncAuditEntry>(
            "SELECT * FROM sync_log ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Most recent entries for the admin view
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<SyncAuditEntry>> {
        let entries = sqlx::query_as::<_, SyncAuditEntry>(
            "SELECT * FROM sync_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sync_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
