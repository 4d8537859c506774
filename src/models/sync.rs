//! Sync audit log and status

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One append-only audit entry recorded by the sync engine.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SyncAuditEntry {
    pub id: i64,
    pub synced_at: DateTime<Utc>,
    pub records_count: i64,
    pub success: bool,
    pub message: String,
}

/// Passive status indicator surfaced to the UI.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncStatus {
    /// Attendance rows plus inventory counts awaiting acknowledgement
    pub unsynced_count: i64,
    pub last: Option<SyncAuditEntry>,
}
