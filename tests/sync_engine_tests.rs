//! Sync engine tests: push acknowledgement, retry, pull merge, idempotence
//! and offline behavior, against an in-memory store and a mocked cloud.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use mockall::Sequence;
use sqlx::sqlite::SqlitePoolOptions;

use kiosk_server::{
    cloud::{Connectivity, RemoteApi, RemoteError},
    config::SyncConfig,
    models::{
        inventory::{RecordCountItem, RecordInventoryCount},
        remote::{
            AttendancePush, InventoryCountPush, RemoteEmployee, RemoteKioskPin, RemoteProduct,
        },
    },
    repository::Repository,
    services::sync::SyncEngine,
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

struct AlwaysOffline;

#[async_trait::async_trait]
impl Connectivity for AlwaysOffline {
    async fn has_connectivity(&self) -> bool {
        false
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

fn remote_employee(id: i64, name: &str) -> RemoteEmployee {
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
        pin_code: Some("4321".to_string()),
        device_id: None,
    }
}

async fn seed_employee(repository: &Repository, id: i64) {
    repository
        .employees
        .upsert_from_remote(&remote_employee(id, "Sara"), Utc::now())
        .await
        .unwrap();
}

async fn seed_unsynced_punch(repository: &Repository, employee_id: i64, time: &str) -> i64 {
    let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let record = repository
        .attendance
        .open_record(
            employee_id,
            date,
            time,
            kiosk_server::models::attendance::AttendanceStatus::Present,
        )
        .await
        .unwrap();
    record.id
}

fn engine(
    repository: Repository,
    remote: MockRemote,
    connectivity: impl Connectivity + 'static,
) -> SyncEngine {
    SyncEngine::new(
        repository,
        Arc::new(remote),
        Arc::new(connectivity),
        SyncConfig::default(),
    )
}

#[tokio::test]
async fn acknowledged_push_flips_exactly_the_batched_rows() {
    let repository = test_repository().await;
    seed_employee(&repository, 1).await;
    let id = seed_unsynced_punch(&repository, 1, "09:00").await;

    let mut remote = MockRemote::new();
    remote
        .expect_push_attendance()
        .withf(|batch| batch.len() == 1 && batch[0].check_in_time.as_deref() == Some("09:00"))
        .times(1)
        .returning(|_| Ok(()));

    let engine = engine(repository.clone(), remote, AlwaysOnline);
    let report = engine.push_attendance().await.unwrap();

    assert!(report.success);
    assert_eq!(report.count, 1);
    assert!(repository.attendance.get_by_id(id).await.unwrap().synced);
    assert_eq!(repository.attendance.count_unsynced().await.unwrap(), 0);

    let last = repository.sync_log.last().await.unwrap().unwrap();
    assert!(last.success);
    assert_eq!(last.records_count, 1);
}

#[tokio::test]
async fn rejected_push_leaves_rows_unsynced_and_retries_without_duplicates() {
    let repository = test_repository().await;
    seed_employee(&repository, 1).await;
    seed_unsynced_punch(&repository, 1, "09:00").await;

    let mut remote = MockRemote::new();
    let mut seq = Sequence::new();
    remote
        .expect_push_attendance()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Err(RemoteError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        });
    // the retry carries the same single row, not a duplicate
    remote
        .expect_push_attendance()
        .withf(|batch| batch.len() == 1)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let engine = engine(repository.clone(), remote, AlwaysOnline);

    let report = engine.push_attendance().await.unwrap();
    assert!(!report.success);
    assert_eq!(repository.attendance.count_unsynced().await.unwrap(), 1);
    let last = repository.sync_log.last().await.unwrap().unwrap();
    assert!(!last.success);

    let report = engine.push_attendance().await.unwrap();
    assert!(report.success);
    assert_eq!(repository.attendance.count_unsynced().await.unwrap(), 0);
}

#[tokio::test]
async fn engine_with_nothing_to_do_is_a_no_op() {
    let repository = test_repository().await;

    // no expectations: any HTTP call fails the test
    let remote = MockRemote::new();
    let engine = engine(repository.clone(), remote, AlwaysOnline);

    let first = engine.push_attendance().await.unwrap();
    let second = engine.push_attendance().await.unwrap();
    assert!(first.success && second.success);
    assert_eq!(first.count + second.count, 0);

    let inventory = engine.push_inventory().await.unwrap();
    assert!(inventory.success);

    // a true no-op: no audit entries were appended
    assert_eq!(repository.sync_log.count().await.unwrap(), 0);
}

#[tokio::test]
async fn offline_cycle_performs_no_http_calls_and_touches_nothing() {
    let repository = test_repository().await;
    seed_employee(&repository, 1).await;
    seed_unsynced_punch(&repository, 1, "09:00").await;

    // no expectations: any HTTP call fails the test
    let remote = MockRemote::new();
    let engine = engine(repository.clone(), remote, AlwaysOffline);

    engine.run_cycle(10).await;

    assert_eq!(repository.attendance.count_unsynced().await.unwrap(), 1);
    assert_eq!(repository.sync_log.count().await.unwrap(), 0);
}

#[tokio::test]
async fn inventory_counts_are_pushed_and_acknowledged_individually() {
    let repository = test_repository().await;
    seed_employee(&repository, 1).await;

    let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    for shift in ["morning", "evening"] {
        repository
            .inventory
            .create(
                1,
                &RecordInventoryCount {
                    count_date: date,
                    shift: shift.to_string(),
                    branch: "main".to_string(),
                    notes: String::new(),
                    items: vec![RecordCountItem {
                        product_id: 7,
                        quantity: 3.5,
                    }],
                },
                Utc::now(),
            )
            .await
            .unwrap();
    }

    let mut remote = MockRemote::new();
    let mut seq = Sequence::new();
    remote
        .expect_push_inventory_count()
        .withf(|count| count.shift == "morning" && count.items.len() == 1)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    remote
        .expect_push_inventory_count()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(RemoteError::Timeout));

    let engine = engine(repository.clone(), remote, AlwaysOnline);
    let report = engine.push_inventory().await.unwrap();

    // first count acknowledged, second left for the next cycle
    assert!(!report.success);
    assert_eq!(repository.inventory.count_unsynced().await.unwrap(), 1);
    let last = repository.sync_log.last().await.unwrap().unwrap();
    assert!(!last.success);
    assert_eq!(last.records_count, 1);
}

#[tokio::test]
async fn pull_refreshes_roster_pin_and_catalog() {
    let repository = test_repository().await;

    let mut remote = MockRemote::new();
    remote
        .expect_fetch_employees()
        .times(1)
        .returning(|| Ok(vec![remote_employee(1, "Sara"), remote_employee(2, "Omar")]));
    remote
        .expect_fetch_kiosk_pin()
        .times(1)
        .returning(|| {
            Ok(RemoteKioskPin {
                pin: Some("9999".to_string()),
            })
        });
    remote.expect_fetch_products().times(1).returning(|| {
        Ok(vec![RemoteProduct {
            id: 7,
            name: "Flour".to_string(),
            category: "dry".to_string(),
            unit: "kg".to_string(),
            current_quantity: 12.5,
            price: 3.0,
            barcode: String::new(),
        }])
    });

    let engine = engine(repository.clone(), remote, AlwaysOnline);
    let report = engine.pull_reference().await.unwrap();

    assert!(report.success);
    assert_eq!(repository.employees.list_active().await.unwrap().len(), 2);
    assert_eq!(repository.settings.admin_pin().await.unwrap(), "9999");
    let products = repository.products.list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Flour");

    // pulls are idempotent and quiet: no audit entries
    assert_eq!(repository.sync_log.count().await.unwrap(), 0);
}

#[tokio::test]
async fn partial_pull_failure_keeps_the_other_feeds() {
    let repository = test_repository().await;

    let mut remote = MockRemote::new();
    remote
        .expect_fetch_employees()
        .times(1)
        .returning(|| Err(RemoteError::Timeout));
    remote
        .expect_fetch_kiosk_pin()
        .times(1)
        .returning(|| Ok(RemoteKioskPin { pin: Some("8888".to_string()) }));
    remote
        .expect_fetch_products()
        .times(1)
        .returning(|| Ok(vec![]));

    let engine = engine(repository.clone(), remote, AlwaysOnline);
    let report = engine.pull_reference().await.unwrap();

    assert!(!report.success);
    assert_eq!(repository.settings.admin_pin().await.unwrap(), "8888");
}

#[tokio::test]
async fn sync_status_aggregates_unsynced_counters() {
    let repository = test_repository().await;
    seed_employee(&repository, 1).await;
    seed_unsynced_punch(&repository, 1, "09:00").await;
    repository
        .inventory
        .create(
            1,
            &RecordInventoryCount {
                count_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
                shift: String::new(),
                branch: String::new(),
                notes: String::new(),
                items: vec![RecordCountItem {
                    product_id: 7,
                    quantity: 1.0,
                }],
            },
            Utc::now(),
        )
        .await
        .unwrap();

    let remote = MockRemote::new();
    let engine = engine(repository.clone(), remote, AlwaysOnline);

    let status = engine.sync_status().await.unwrap();
    assert_eq!(status.unsynced_count, 2);
    assert!(status.last.is_none());
}

#[tokio::test]
async fn audit_log_is_pruned_to_recent_history() {
    let repository = test_repository().await;

    for i in 0..5 {
        repository
            .sync_log
            .append(Utc::now(), i, true, "entry", 3)
            .await
            .unwrap();
    }

    assert_eq!(repository.sync_log.count().await.unwrap(), 3);
    let recent = repository.sync_log.recent(10).await.unwrap();
    assert_eq!(recent.len(), 3);
    // newest first
    assert_eq!(recent[0].records_count, 4);
}
