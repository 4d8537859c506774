//! Attendance record model and punch types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Derived attendance status for a day record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        };
        write!(f, "{}", label)
    }
}

/// One check-in/check-out cycle for an employee on a date.
///
/// A record with a non-null `check_out_time` is closed; a later punch on the
/// same date opens a new record instead of touching it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: i64,
    pub employee_id: i64,
    pub attendance_date: NaiveDate,
    /// "HH:MM"
    pub check_in_time: Option<String>,
    /// "HH:MM", set on close
    pub check_out_time: Option<String>,
    pub status: AttendanceStatus,
    pub source: String,
    pub synced: bool,
    pub notes: String,
}

impl AttendanceRecord {
    pub fn is_closed(&self) -> bool {
        self.check_out_time.is_some()
    }
}

/// Day-view row for the kiosk UI: record joined with the employee.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TodayRecord {
    pub id: i64,
    pub employee_id: i64,
    pub name: String,
    pub job_title: String,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub status: AttendanceStatus,
}

/// What a punch did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PunchAction {
    CheckIn,
    CheckOut,
}

/// Result of a punch, echoed back so the UI can confirm it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PunchOutcome {
    pub action: PunchAction,
    pub employee_name: String,
    /// "HH:MM" the punch was recorded at
    pub time: String,
    pub record: AttendanceRecord,
}
