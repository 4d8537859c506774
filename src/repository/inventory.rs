//! Inventory counts repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::inventory::{
        InventoryCount, InventoryCountDetails, InventoryCountItem, RecordInventoryCount,
    },
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Sqlite>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Insert a count with its items. One transaction: a count must never be
    /// half-written.
    pub async fn create(
        &self,
        employee_id: i64,
        req: &RecordInventoryCount,
        created_at: DateTime<Utc>,
    ) -> AppResult<InventoryCountDetails> {
        let mut tx = self.pool.begin().await?;

        let count_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO inventory_counts (employee_id, count_date, shift, branch, notes, synced, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING id
            "#,
        )
        .bind(employee_id)
        .bind(req.count_date)
        .bind(&req.shift)
        .bind(&req.branch)
        .bind(&req.notes)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        for item in &req.items {
            sqlx::query(
                "INSERT INTO inventory_count_items (count_id, product_id, quantity) VALUES (?, ?, ?)",
            )
            .bind(count_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(count_id).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<InventoryCountDetails> {
        let count = sqlx::query_as::<_, InventoryCount>(
            "SELECT * FROM inventory_counts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inventory count {} not found", id)))?;

        let items = self.items_for(id).await?;

        Ok(InventoryCountDetails { count, items })
    }

    /// Items of a count, in capture order
    pub async fn items_for(&self, count_id: i64) -> AppResult<Vec<InventoryCountItem>> {
        let items = sqlx::query_as::<_, InventoryCountItem>(
            "SELECT * FROM inventory_count_items WHERE count_id = ? ORDER BY id",
        )
        .bind(count_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn fetch_unsynced(&self) -> AppResult<Vec<InventoryCount>> {
        let counts = sqlx::query_as::<_, InventoryCount>(
            "SELECT * FROM inventory_counts WHERE synced = 0 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    pub async fn mark_synced(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE inventory_counts SET synced = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_unsynced(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory_counts WHERE synced = 0")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
