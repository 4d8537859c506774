//! Settings repository: a flat key/value store for cloud-pulled settings

use sqlx::{Pool, Sqlite};

use crate::error::AppResult;

/// Settings key holding the administrator access PIN
pub const ADMIN_PIN_KEY: &str = "hr_kiosk_admin_pin";

/// PIN accepted until the first successful settings pull
pub const DEFAULT_ADMIN_PIN: &str = "1234";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Sqlite>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cached admin PIN, so admin functions keep working offline
    pub async fn admin_pin(&self) -> AppResult<String> {
        Ok(self
            .get(ADMIN_PIN_KEY)
            .await?
            .unwrap_or_else(|| DEFAULT_ADMIN_PIN.to_string()))
    }
}
