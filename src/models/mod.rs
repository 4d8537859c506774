//! Data models for the kiosk

pub mod attendance;
pub mod employee;
pub mod inventory;
pub mod product;
pub mod remote;
pub mod sync;

// Re-export commonly used types
pub use attendance::{AttendanceRecord, AttendanceStatus, PunchAction, PunchOutcome};
pub use employee::{DeviceBinding, Employee};
pub use inventory::{InventoryCount, InventoryCountItem};
pub use product::Product;
pub use sync::{SyncAuditEntry, SyncStatus};
