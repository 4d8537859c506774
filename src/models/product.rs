//! Product catalog model (read-only reference data)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// The slice of the cloud product catalog the kiosk needs for counting.
/// Fully replaced on each reference pull, never mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub current_quantity: f64,
    pub price: f64,
    pub barcode: String,
}
