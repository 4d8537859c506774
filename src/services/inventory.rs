//! Offline inventory count capture

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        inventory::{InventoryCountDetails, RecordInventoryCount},
        product::Product,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Capture a count on behalf of an employee. Counts are immutable once
    /// recorded; only the sync engine touches them afterwards, to flip the
    /// synced flag.
    pub async fn record_count(
        &self,
        employee_id: i64,
        req: RecordInventoryCount,
    ) -> AppResult<InventoryCountDetails> {
        req.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let employee = self
            .repository
            .employees
            .find_active(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

        let details = self
            .repository
            .inventory
            .create(employee.id, &req, Utc::now())
            .await?;

        tracing::info!(
            employee_id,
            count_id = details.count.id,
            items = details.items.len(),
            "inventory count recorded"
        );

        Ok(details)
    }

    /// Cached product catalog for the counting UI
    pub async fn products(&self) -> AppResult<Vec<Product>> {
        self.repository.products.list().await
    }
}
