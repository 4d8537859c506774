//! Offline inventory count capture

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// An inventory count header. Immutable once created; the sync engine only
/// ever flips `synced`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryCount {
    pub id: i64,
    pub employee_id: i64,
    pub count_date: NaiveDate,
    pub shift: String,
    pub branch: String,
    pub notes: String,
    pub synced: bool,
    pub created_at: DateTime<Utc>,
}

/// One counted line within a count, in capture order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InventoryCountItem {
    pub id: i64,
    pub count_id: i64,
    pub product_id: i64,
    pub quantity: f64,
}

/// A count with its lines attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryCountDetails {
    pub count: InventoryCount,
    pub items: Vec<InventoryCountItem>,
}

/// Request to record a count from the kiosk UI
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordInventoryCount {
    pub count_date: NaiveDate,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub notes: String,
    #[validate(length(min = 1, message = "a count needs at least one item"))]
    pub items: Vec<RecordCountItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordCountItem {
    pub product_id: i64,
    pub quantity: f64,
}
