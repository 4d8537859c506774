//! Attendance state machine
//!
//! Per (employee, date) a day is a sequence of cycles:
//! `NoRecord -> Open -> Closed -> Open -> Closed -> ...`, re-openable after
//! close with unbounded cycles per day. A punch either opens a new cycle or
//! closes the current open one.

use chrono::{Datelike, NaiveDateTime};

use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{AttendanceStatus, PunchAction, PunchOutcome, TodayRecord},
        employee::{parse_minutes, Employee},
    },
    repository::Repository,
};

use super::device::DeviceService;

/// How a punch authenticates itself
#[derive(Debug, Clone)]
pub enum PunchAuth {
    /// Caller already holds a verified session (admin UI)
    Session,
    /// Device claiming an existing binding
    Device(String),
    /// Raw PIN claim
    Pin(String),
}

#[derive(Clone)]
pub struct AttendanceService {
    repository: Repository,
    device: DeviceService,
}

impl AttendanceService {
    pub fn new(repository: Repository, device: DeviceService) -> Self {
        Self { repository, device }
    }

    /// Record a punch for an employee at `now` (kiosk-local time).
    pub async fn punch(
        &self,
        employee_id: i64,
        auth: PunchAuth,
        now: NaiveDateTime,
    ) -> AppResult<PunchOutcome> {
        let employee = self
            .repository
            .employees
            .find_active(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

        self.authorize(&employee, &auth).await?;

        let today = now.date();
        let time = now.format("%H:%M").to_string();

        let latest = self
            .repository
            .attendance
            .latest_for_day(employee_id, today)
            .await?;

        let (action, record) = match latest {
            // Open cycle: this punch closes it, on that exact row
            Some(open) if !open.is_closed() => {
                let record = self.repository.attendance.close_record(open.id, &time).await?;
                (PunchAction::CheckOut, record)
            }
            // No record yet, or only closed cycles: open a new one
            _ => {
                let status = if employee.is_off_day(today.weekday()) {
                    // Working on an off day is never penalized
                    AttendanceStatus::Present
                } else {
                    status_for_check_in(
                        parse_minutes(&time),
                        employee.start_minutes(),
                        employee.late_threshold_minutes,
                    )
                };
                let record = self
                    .repository
                    .attendance
                    .open_record(employee_id, today, &time, status)
                    .await?;
                (PunchAction::CheckIn, record)
            }
        };

        tracing::info!(employee_id, ?action, %time, "punch recorded");

        Ok(PunchOutcome {
            action,
            employee_name: employee.name,
            time,
            record,
        })
    }

    /// Day view for the kiosk UI
    pub async fn today(&self, now: NaiveDateTime) -> AppResult<Vec<TodayRecord>> {
        self.repository.attendance.today_records(now.date()).await
    }

    /// Active roster for the kiosk UI
    pub async fn roster(&self) -> AppResult<Vec<Employee>> {
        self.repository.employees.list_active().await
    }

    /// Session > verified device binding > PIN claim, in that order.
    async fn authorize(&self, employee: &Employee, auth: &PunchAuth) -> AppResult<()> {
        match auth {
            PunchAuth::Session => Ok(()),
            PunchAuth::Device(device_id) => {
                if self.device.verify(employee.id, device_id).await? {
                    Ok(())
                } else {
                    Err(AppError::Unauthorized(
                        "device is not bound to this employee".to_string(),
                    ))
                }
            }
            PunchAuth::Pin(pin) => match employee.pin_code.as_deref() {
                Some(stored) if stored == pin.as_str() => Ok(()),
                _ => Err(AppError::Unauthorized("PIN rejected".to_string())),
            },
        }
    }
}

/// The late policy: late iff the check-in is more than `threshold` minutes
/// past the scheduled start. No check-in at all means absent; no usable
/// schedule means present.
pub(crate) fn status_for_check_in(
    check_in_minutes: Option<i64>,
    start_minutes: Option<i64>,
    threshold: i64,
) -> AttendanceStatus {
    match (check_in_minutes, start_minutes) {
        (None, _) => AttendanceStatus::Absent,
        (Some(_), None) => AttendanceStatus::Present,
        (Some(ci), Some(ws)) => {
            if ci - ws > threshold {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_time_is_present() {
        // start 09:00, threshold 15: 09:15 is the last present minute
        assert_eq!(status_for_check_in(Some(540), Some(540), 15), AttendanceStatus::Present);
        assert_eq!(status_for_check_in(Some(555), Some(540), 15), AttendanceStatus::Present);
    }

    #[test]
    fn past_threshold_is_late() {
        assert_eq!(status_for_check_in(Some(556), Some(540), 15), AttendanceStatus::Late);
        assert_eq!(status_for_check_in(Some(700), Some(540), 15), AttendanceStatus::Late);
    }

    #[test]
    fn early_check_in_is_present() {
        assert_eq!(status_for_check_in(Some(480), Some(540), 15), AttendanceStatus::Present);
    }

    #[test]
    fn missing_check_in_is_absent() {
        assert_eq!(status_for_check_in(None, Some(540), 15), AttendanceStatus::Absent);
    }

    #[test]
    fn missing_schedule_is_present() {
        assert_eq!(status_for_check_in(Some(900), None, 15), AttendanceStatus::Present);
    }

    #[test]
    fn zero_threshold_boundary() {
        assert_eq!(status_for_check_in(Some(540), Some(540), 0), AttendanceStatus::Present);
        assert_eq!(status_for_check_in(Some(541), Some(540), 0), AttendanceStatus::Late);
    }
}
