//! Wire types for the cloud REST contract.
//!
//! Inbound payloads are loosely typed on the cloud side (numbers sometimes
//! arrive as strings, fields go missing), so everything is validated and
//! coerced here, at the ingestion boundary. Outbound payloads mirror the
//! field names the cloud endpoints expect.

use serde::{Deserialize, Deserializer, Serialize};

use super::attendance::AttendanceRecord;
use super::inventory::{InventoryCount, InventoryCountItem};

// ---------------------------------------------------------------------------
// Lenient scalar coercion
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Str(String),
}

fn lenient_i64<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match RawNumber::deserialize(de)? {
        RawNumber::Int(v) => Ok(v),
        RawNumber::Float(v) => Ok(v as i64),
        RawNumber::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not an integer: {:?}", s))),
    }
}

fn lenient_f64_or_zero<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(match Option::<RawNumber>::deserialize(de)? {
        Some(RawNumber::Int(v)) => v as f64,
        Some(RawNumber::Float(v)) => v,
        Some(RawNumber::Str(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

fn lenient_threshold<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    Ok(match Option::<RawNumber>::deserialize(de)? {
        Some(RawNumber::Int(v)) => v,
        Some(RawNumber::Float(v)) => v as i64,
        Some(RawNumber::Str(s)) => s.trim().parse().unwrap_or(15),
        None => 15,
    })
}

/// PIN codes are compared as strings but some clients send them as numbers.
fn lenient_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<RawNumber>::deserialize(de)? {
        Some(RawNumber::Str(s)) if s.is_empty() => None,
        Some(RawNumber::Str(s)) => Some(s),
        Some(RawNumber::Int(v)) => Some(v.to_string()),
        Some(RawNumber::Float(v)) => Some(v.to_string()),
        None => None,
    })
}

fn default_threshold() -> i64 {
    15
}

fn default_start() -> String {
    "09:00".to_string()
}

fn default_end() -> String {
    "17:00".to_string()
}

fn default_true() -> bool {
    true
}

pub fn default_off_days() -> Vec<u32> {
    vec![5, 6]
}

// ---------------------------------------------------------------------------
// Inbound reference data
// ---------------------------------------------------------------------------

/// Employee as served by `GET /employees`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEmployee {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default = "default_start")]
    pub work_start_time: String,
    #[serde(default = "default_end")]
    pub work_end_time: String,
    #[serde(default = "default_threshold", deserialize_with = "lenient_threshold")]
    pub late_threshold_minutes: i64,
    #[serde(default)]
    pub off_days: Option<Vec<u32>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub pin_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub device_id: Option<String>,
}

impl RemoteEmployee {
    /// Off days as canonical JSON for local storage.
    pub fn off_days_json(&self) -> String {
        let days = self.off_days.clone().unwrap_or_else(default_off_days);
        serde_json::to_string(&days).unwrap_or_else(|_| "[5,6]".to_string())
    }
}

/// Body of `GET /settings/kiosk-pin`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteKioskPin {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub pin: Option<String>,
}

/// Product as served by `GET /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    #[serde(deserialize_with = "lenient_i64")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_f64_or_zero")]
    pub current_quantity: f64,
    #[serde(default, deserialize_with = "lenient_f64_or_zero")]
    pub price: f64,
    #[serde(default)]
    pub barcode: String,
}

// ---------------------------------------------------------------------------
// Outbound pushes
// ---------------------------------------------------------------------------

/// One attendance row in the `POST /attendance/sync` batch.
#[derive(Debug, Clone, Serialize)]
pub struct AttendancePush {
    pub employee_id: i64,
    pub attendance_date: String,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub status: String,
    pub source: String,
    pub notes: String,
}

impl From<&AttendanceRecord> for AttendancePush {
    fn from(r: &AttendanceRecord) -> Self {
        Self {
            employee_id: r.employee_id,
            attendance_date: r.attendance_date.to_string(),
            check_in_time: r.check_in_time.clone(),
            check_out_time: r.check_out_time.clone(),
            status: r.status.to_string(),
            source: r.source.clone(),
            notes: r.notes.clone(),
        }
    }
}

/// Body of `POST /inventory-counts`.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryCountPush {
    pub employee_id: i64,
    pub count_date: String,
    pub shift: String,
    pub branch: String,
    pub items: Vec<InventoryItemPush>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemPush {
    pub product_id: i64,
    pub counted_quantity: f64,
}

impl InventoryCountPush {
    pub fn new(count: &InventoryCount, items: &[InventoryCountItem]) -> Self {
        Self {
            employee_id: count.employee_id,
            count_date: count.count_date.to_string(),
            shift: count.shift.clone(),
            branch: count.branch.clone(),
            items: items
                .iter()
                .map(|i| InventoryItemPush {
                    product_id: i.product_id,
                    counted_quantity: i.quantity,
                })
                .collect(),
            notes: count.notes.clone(),
        }
    }
}

/// Partial employee update used for device-binding propagation
/// (`PUT /employees/{id}`).
#[derive(Debug, Clone, Serialize)]
pub struct DeviceBindingUpdate {
    pub device_id: Option<String>,
}
