//! Attendance repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::attendance::{AttendanceRecord, AttendanceStatus, TodayRecord},
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: Pool<Sqlite>,
}

impl AttendanceRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get record by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<AttendanceRecord> {
        sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance record {} not found", id)))
    }

    /// Most recent record for an employee on a date, `None` when the day has
    /// no records yet. Recency by insertion order: a day may hold several
    /// closed cycles and at most one open one, which is always the newest.
    pub async fn latest_for_day(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance
            WHERE employee_id = ? AND attendance_date = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Open a new check-in cycle
    pub async fn open_record(
        &self,
        employee_id: i64,
        date: NaiveDate,
        check_in: &str,
        status: AttendanceStatus,
    ) -> AppResult<AttendanceRecord> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO attendance (employee_id, attendance_date, check_in_time, status, synced)
            VALUES (?, ?, ?, ?, 0)
            RETURNING id
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(check_in)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Close an open cycle. The check-out lands on that exact row.
    pub async fn close_record(&self, id: i64, check_out: &str) -> AppResult<AttendanceRecord> {
        sqlx::query("UPDATE attendance SET check_out_time = ?, synced = 0 WHERE id = ?")
            .bind(check_out)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(id).await
    }

    /// Snapshot of all rows awaiting acknowledgement
    pub async fn fetch_unsynced(&self) -> AppResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE synced = 0 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Acknowledge exactly the given rows. Identity-based so rows created
    /// after the push snapshot was taken stay unsynced.
    pub async fn mark_synced(&self, ids: &[i64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let query = format!("UPDATE attendance SET synced = 1 WHERE id IN ({})", placeholders);

        let mut builder = sqlx::query(&query);
        for id in ids {
            builder = builder.bind(id);
        }
        builder.execute(&self.pool).await?;

        Ok(())
    }

    pub async fn count_unsynced(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE synced = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Day view for the kiosk UI, joined with employee names
    pub async fn today_records(&self, date: NaiveDate) -> AppResult<Vec<TodayRecord>> {
        let records = sqlx::query_as::<_, TodayRecord>(
            r#"
            SELECT a.id, a.employee_id, e.name, e.job_title,
                   a.check_in_time, a.check_out_time, a.status
            FROM attendance a
            JOIN employees e ON a.employee_id = e.id
            WHERE a.attendance_date = ?
            ORDER BY a.check_in_time
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
