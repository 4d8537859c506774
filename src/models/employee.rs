//! Employee model and device binding

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Employee reference data, pulled from the cloud and cached locally.
///
/// `device_id` is the one mutable-from-the-kiosk field: it records which
/// physical device may punch for this employee without re-entering a PIN.
/// `device_synced` is 0 while a local binding change has not yet been
/// acknowledged by the cloud.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub job_title: String,
    /// "HH:MM"
    pub work_start_time: String,
    /// "HH:MM"
    pub work_end_time: String,
    pub late_threshold_minutes: i64,
    /// JSON array of non-working weekdays, Sunday = 0 .. Saturday = 6
    pub off_days: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub pin_code: Option<String>,
    pub device_id: Option<String>,
    #[serde(skip_serializing)]
    pub device_synced: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// Parsed off-day set. Malformed stored JSON counts as no off days.
    pub fn off_day_set(&self) -> Vec<u32> {
        serde_json::from_str(&self.off_days).unwrap_or_default()
    }

    /// Membership test in the Sunday = 0 convention.
    pub fn is_off_day(&self, weekday: Weekday) -> bool {
        self.off_day_set().contains(&weekday.num_days_from_sunday())
    }

    /// Scheduled start as minutes of day, `None` when unset or unparseable.
    pub fn start_minutes(&self) -> Option<i64> {
        parse_minutes(&self.work_start_time)
    }
}

/// Parse "HH:MM" into minutes of day.
pub fn parse_minutes(time: &str) -> Option<i64> {
    let (h, m) = time.split_once(':')?;
    let h: i64 = h.trim().parse().ok()?;
    let m: i64 = m.trim().parse().ok()?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    Some(h * 60 + m)
}

/// An established employee/device association.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceBinding {
    pub employee_id: i64,
    pub employee_name: String,
    pub device_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(off_days: &str) -> Employee {
        Employee {
            id: 1,
            name: "Test".into(),
            phone: String::new(),
            job_title: String::new(),
            work_start_time: "09:00".into(),
            work_end_time: "17:00".into(),
            late_threshold_minutes: 15,
            off_days: off_days.into(),
            is_active: true,
            pin_code: None,
            device_id: None,
            device_synced: true,
            last_synced_at: None,
        }
    }

    #[test]
    fn parses_minutes_of_day() {
        assert_eq!(parse_minutes("09:00"), Some(540));
        assert_eq!(parse_minutes("00:01"), Some(1));
        assert_eq!(parse_minutes("23:59"), Some(1439));
        assert_eq!(parse_minutes("24:00"), None);
        assert_eq!(parse_minutes("9"), None);
        assert_eq!(parse_minutes(""), None);
    }

    #[test]
    fn off_days_use_sunday_zero_convention() {
        let emp = employee("[5,6]");
        // 5 = Friday, 6 = Saturday in the Sunday = 0 numbering
        assert!(emp.is_off_day(Weekday::Fri));
        assert!(emp.is_off_day(Weekday::Sat));
        assert!(!emp.is_off_day(Weekday::Sun));
        assert!(!emp.is_off_day(Weekday::Mon));
    }

    #[test]
    fn malformed_off_days_means_no_off_days() {
        let emp = employee("not json");
        assert!(emp.off_day_set().is_empty());
    }
}
