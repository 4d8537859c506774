//! Attendance state machine and device binding tests
//!
//! Run against an in-memory store with the cloud mocked out, so they cover
//! the same code paths the kiosk runs offline.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqlitePoolOptions;

use kiosk_server::{
    cloud::{Connectivity, RemoteApi, RemoteError},
    config::SyncConfig,
    error::AppError,
    models::{
        attendance::{AttendanceRecord, AttendanceStatus, PunchAction},
        remote::{
            AttendancePush, InventoryCountPush, RemoteEmployee, RemoteKioskPin, RemoteProduct,
        },
    },
    repository::Repository,
    services::{attendance::PunchAuth, Services},
};

mockall::mock! {
    pub Remote {}

    #[async_trait::async_trait]
    impl RemoteApi for Remote {
        async fn push_attendance(&self, batch: Vec<AttendancePush>) -> Result<(), RemoteError>;
        async fn push_inventory_count(&self, count: InventoryCountPush) -> Result<(), RemoteError>;
        async fn fetch_employees(&self) -> Result<Vec<RemoteEmployee>, RemoteError>;
        async fn fetch_kiosk_pin(&self) -> Result<RemoteKioskPin, RemoteError>;
        async fn fetch_products(&self) -> Result<Vec<RemoteProduct>, RemoteError>;
        async fn update_employee_device(
            &self,
            employee_id: i64,
            device_id: Option<String>,
        ) -> Result<(), RemoteError>;
    }
}

struct AlwaysOnline;

#[async_trait::async_trait]
impl Connectivity for AlwaysOnline {
    async fn has_connectivity(&self) -> bool {
        true
    }
}

async fn test_repository() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory store");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Repository::new(pool)
}

fn remote_employee(id: i64, name: &str, pin: Option<&str>) -> RemoteEmployee {
    RemoteEmployee {
        id,
        name: name.to_string(),
        phone: String::new(),
        job_title: String::new(),
        work_start_time: "09:00".to_string(),
        work_end_time: "17:00".to_string(),
        late_threshold_minutes: 15,
        off_days: Some(vec![5, 6]),
        is_active: true,
        pin_code: pin.map(str::to_string),
        device_id: None,
    }
}

/// Services wired to a mock cloud whose propagation calls always fail, so
/// local state stays exactly what the kiosk wrote.
fn offline_propagation_services(repository: Repository) -> Services {
    let mut remote = MockRemote::new();
    remote
        .expect_update_employee_device()
        .returning(|_, _| Err(RemoteError::Timeout));

    Services::new(
        repository,
        Arc::new(remote),
        Arc::new(AlwaysOnline),
        SyncConfig::default(),
    )
}

fn at(date: NaiveDate, time: &str) -> NaiveDateTime {
    date.and_time(time.parse().expect("bad test time"))
}

async fn day_records(repository: &Repository, employee_id: i64) -> Vec<AttendanceRecord> {
    sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance WHERE employee_id = ? ORDER BY id",
    )
    .bind(employee_id)
    .fetch_all(&repository.pool)
    .await
    .expect("Failed to read attendance rows")
}

/// Wednesday, a working day for the default [5,6] off-day set
fn workday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
}

#[tokio::test]
async fn check_in_within_threshold_is_present() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    let emp = remote_employee(1, "Sara", Some("4321"));
    repository
        .employees
        .upsert_from_remote(&emp, chrono::Utc::now())
        .await
        .unwrap();

    let outcome = services
        .attendance
        .punch(1, PunchAuth::Pin("4321".into()), at(workday(), "09:10:00"))
        .await
        .unwrap();

    assert_eq!(outcome.action, PunchAction::CheckIn);
    assert_eq!(outcome.record.status, AttendanceStatus::Present);
    assert_eq!(outcome.record.check_in_time.as_deref(), Some("09:10"));
    assert!(!outcome.record.synced);
}

#[tokio::test]
async fn check_in_past_threshold_is_late() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    // start 09:00, threshold 15: 09:16 is one minute past the boundary
    let outcome = services
        .attendance
        .punch(1, PunchAuth::Pin("4321".into()), at(workday(), "09:16:00"))
        .await
        .unwrap();

    assert_eq!(outcome.record.status, AttendanceStatus::Late);
}

#[tokio::test]
async fn off_day_punch_is_never_late() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    // 2026-03-06 is a Friday: day 5 in the Sunday = 0 numbering
    let friday = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
    let outcome = services
        .attendance
        .punch(1, PunchAuth::Pin("4321".into()), at(friday, "15:45:00"))
        .await
        .unwrap();

    assert_eq!(outcome.record.status, AttendanceStatus::Present);
}

#[tokio::test]
async fn open_close_open_close_yields_two_distinct_records() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    let punches = ["08:55:00", "13:00:00", "14:00:00", "18:05:00"];
    let mut actions = Vec::new();
    for time in punches {
        let outcome = services
            .attendance
            .punch(1, PunchAuth::Pin("4321".into()), at(workday(), time))
            .await
            .unwrap();
        actions.push(outcome.action);
    }

    assert_eq!(
        actions,
        vec![
            PunchAction::CheckIn,
            PunchAction::CheckOut,
            PunchAction::CheckIn,
            PunchAction::CheckOut
        ]
    );

    let records = day_records(&repository, 1).await;
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);
    for record in &records {
        assert!(record.check_in_time.is_some());
        assert!(record.check_out_time.is_some());
    }
    // the first cycle was not overwritten by the second
    assert_eq!(records[0].check_in_time.as_deref(), Some("08:55"));
    assert_eq!(records[0].check_out_time.as_deref(), Some("13:00"));
    assert_eq!(records[1].check_in_time.as_deref(), Some("14:00"));
}

#[tokio::test]
async fn punch_with_wrong_pin_is_unauthorized() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    let err = services
        .attendance
        .punch(1, PunchAuth::Pin("0000".into()), at(workday(), "09:00:00"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(day_records(&repository, 1).await.is_empty());
}

#[tokio::test]
async fn punch_for_unknown_employee_is_not_found() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository);

    let err = services
        .attendance
        .punch(99, PunchAuth::Session, at(workday(), "09:00:00"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn bound_device_punches_without_pin() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    services.device.link(1, "4321", "devA").await.unwrap();

    let outcome = services
        .attendance
        .punch(1, PunchAuth::Device("devA".into()), at(workday(), "09:02:00"))
        .await
        .unwrap();
    assert_eq!(outcome.action, PunchAction::CheckIn);

    // an unbound device gets no free punch
    let err = services
        .attendance
        .punch(1, PunchAuth::Device("devZ".into()), at(workday(), "09:30:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn binding_lifecycle() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    // link then verify
    assert!(!services.device.verify(1, "devA").await.unwrap());
    services.device.link(1, "4321", "devA").await.unwrap();
    assert!(services.device.verify(1, "devA").await.unwrap());
    assert!(!services.device.verify(1, "devB").await.unwrap());

    // relinking the same device is idempotent
    services.device.link(1, "4321", "devA").await.unwrap();

    // a different device cannot steal the binding
    let err = services.device.link(1, "4321", "devB").await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyBoundElsewhere));

    // admin unlink, then the new device may claim it
    services.device.unlink(1, "1234").await.unwrap();
    assert!(!services.device.verify(1, "devA").await.unwrap());
    services.device.link(1, "4321", "devB").await.unwrap();
    assert!(services.device.verify(1, "devB").await.unwrap());
}

#[tokio::test]
async fn link_rejects_wrong_pin_and_unknown_employee() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();

    let err = services.device.link(1, "9999", "devA").await.unwrap_err();
    assert!(matches!(err, AppError::PinMismatch));

    let err = services.device.link(42, "4321", "devA").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn unlink_requires_admin_pin() {
    let repository = test_repository().await;
    let services = offline_propagation_services(repository.clone());
    repository
        .employees
        .upsert_from_remote(&remote_employee(1, "Sara", Some("4321")), chrono::Utc::now())
        .await
        .unwrap();
    services.device.link(1, "4321", "devA").await.unwrap();

    let err = services.device.unlink(1, "0000").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(services.device.verify(1, "devA").await.unwrap());
}

#[tokio::test]
async fn pull_preserves_unacknowledged_local_binding() {
    let repository = test_repository().await;
    let mut emp = remote_employee(1, "Sara", Some("4321"));
    repository
        .employees
        .upsert_from_remote(&emp, chrono::Utc::now())
        .await
        .unwrap();

    // local link, not yet acknowledged by the cloud
    repository
        .employees
        .set_device(1, Some("devA"), false)
        .await
        .unwrap();

    // a pull with no binding on the remote side must not clobber it
    emp.device_id = None;
    repository
        .employees
        .upsert_from_remote(&emp, chrono::Utc::now())
        .await
        .unwrap();
    let stored = repository.employees.get_by_id(1).await.unwrap();
    assert_eq!(stored.device_id.as_deref(), Some("devA"));

    // once acknowledged, the remote value wins: this is how a remote unlink
    // instruction reaches the kiosk
    repository.employees.mark_device_synced(1).await.unwrap();
    repository
        .employees
        .upsert_from_remote(&emp, chrono::Utc::now())
        .await
        .unwrap();
    let stored = repository.employees.get_by_id(1).await.unwrap();
    assert_eq!(stored.device_id, None);
}
