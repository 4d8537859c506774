//! Employees repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::{employee::Employee, remote::RemoteEmployee},
};

#[derive(Clone)]
pub struct EmployeesRepository {
    pool: Pool<Sqlite>,
}

impl EmployeesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get employee by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee with id {} not found", id)))
    }

    /// Get an active employee, `None` if missing or deactivated
    pub async fn find_active(&self, id: i64) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Active roster for the kiosk UI
    pub async fn list_active(&self) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    /// Set or clear the device binding. `synced` records whether the cloud
    /// has already acknowledged this value.
    pub async fn set_device(
        &self,
        id: i64,
        device_id: Option<&str>,
        synced: bool,
    ) -> AppResult<()> {
        sqlx::query("UPDATE employees SET device_id = ?, device_synced = ? WHERE id = ?")
            .bind(device_id)
            .bind(synced)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark the current binding as acknowledged by the cloud
    pub async fn mark_device_synced(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE employees SET device_synced = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Upsert one employee from a reference pull. Identity-keyed so repeated
    /// pulls are idempotent. The device binding is only overwritten once the
    /// local value has been acknowledged (`device_synced = 1`); an
    /// unacknowledged local bind or unlink stays authoritative.
    pub async fn upsert_from_remote(
        &self,
        emp: &RemoteEmployee,
        pulled_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employees (
                id, name, phone, job_title, work_start_time, work_end_time,
                late_threshold_minutes, off_days, is_active, pin_code,
                device_id, device_synced, last_synced_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                job_title = excluded.job_title,
                work_start_time = excluded.work_start_time,
                work_end_time = excluded.work_end_time,
                late_threshold_minutes = excluded.late_threshold_minutes,
                off_days = excluded.off_days,
                is_active = excluded.is_active,
                pin_code = excluded.pin_code,
                device_id = CASE WHEN employees.device_synced = 0
                    THEN employees.device_id ELSE excluded.device_id END,
                device_synced = CASE WHEN employees.device_synced = 0
                    THEN 0 ELSE 1 END,
                last_synced_at = excluded.last_synced_at
            "#,
        )
        .bind(emp.id)
        .bind(&emp.name)
        .bind(&emp.phone)
        .bind(&emp.job_title)
        .bind(&emp.work_start_time)
        .bind(&emp.work_end_time)
        .bind(emp.late_threshold_minutes)
        .bind(emp.off_days_json())
        .bind(emp.is_active)
        .bind(&emp.pin_code)
        .bind(&emp.device_id)
        .bind(pulled_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
