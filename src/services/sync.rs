//! Background reconciliation engine
//!
//! One recurring task pushes unsynced local mutations out and pulls
//! authoritative reference data in, gated by the connectivity probe. Push
//! runs before pull within a cycle so freshly captured local data is never
//! clobbered by a same-cycle reference pull. Everything here is at-least-once
//! with idempotent retry; the remote endpoints tolerate duplicates.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use utoipa::ToSchema;

use crate::{
    cloud::{Connectivity, RemoteApi, RemoteError},
    config::SyncConfig,
    error::AppResult,
    models::{
        remote::{AttendancePush, InventoryCountPush},
        sync::SyncStatus,
    },
    repository::{settings::ADMIN_PIN_KEY, Repository},
};

/// Outcome of one push or pull pass, also the body of the manual triggers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncReport {
    pub success: bool,
    pub count: i64,
    pub message: String,
}

impl SyncReport {
    fn nothing() -> Self {
        Self {
            success: true,
            count: 0,
            message: "nothing to sync".to_string(),
        }
    }

    fn synced(count: i64, what: &str) -> Self {
        Self {
            success: true,
            count,
            message: format!("synced {} {}", count, what),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            count: 0,
            message,
        }
    }

    fn merge(self, other: SyncReport) -> Self {
        Self {
            success: self.success && other.success,
            count: self.count + other.count,
            message: if self.success && other.success {
                format!("{}; {}", self.message, other.message)
            } else if self.success {
                other.message
            } else {
                self.message
            },
        }
    }
}

pub struct SyncEngine {
    repository: Repository,
    remote: Arc<dyn RemoteApi>,
    connectivity: Arc<dyn Connectivity>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        repository: Repository,
        remote: Arc<dyn RemoteApi>,
        connectivity: Arc<dyn Connectivity>,
        config: SyncConfig,
    ) -> Self {
        Self {
            repository,
            remote,
            connectivity,
            config,
        }
    }

    /// Run until `shutdown` flips. An immediate pull-then-push pass brings a
    /// freshly started kiosk current before the periodic loop begins.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        if self.connectivity.has_connectivity().await {
            if let Err(e) = self.pull_reference().await {
                tracing::warn!(error = %e, "startup reference pull failed");
            }
            self.push_pass().await;
        } else {
            tracing::info!("starting offline; local store remains authoritative");
        }

        let mut interval = tokio::time::interval(Duration::from_secs(self.config.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately; the startup pass covered it
        interval.tick().await;

        let mut cycle: u32 = 0;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    cycle = cycle.wrapping_add(1);
                    self.run_cycle(cycle).await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("sync engine stopping");
                    return;
                }
            }
        }
    }

    /// One engine cycle. Any error is logged and swallowed: a bad cycle must
    /// never take the background task down.
    pub async fn run_cycle(&self, cycle: u32) {
        if !self.connectivity.has_connectivity().await {
            tracing::debug!("no connectivity, skipping sync cycle");
            return;
        }

        self.push_pass().await;

        if self.config.pull_every_cycles > 0 && cycle % self.config.pull_every_cycles == 0 {
            if let Err(e) = self.pull_reference().await {
                tracing::warn!(error = %e, "reference pull failed");
            }
        }
    }

    async fn push_pass(&self) {
        if let Err(e) = self.push_attendance().await {
            tracing::error!(error = %e, "attendance push pass failed");
        }
        if let Err(e) = self.push_inventory().await {
            tracing::error!(error = %e, "inventory push pass failed");
        }
    }

    /// Push all unsynced attendance rows as one batch. On acknowledgement,
    /// exactly the snapshotted rows are flipped; rows punched while the
    /// request was in flight stay unsynced for the next cycle.
    pub async fn push_attendance(&self) -> AppResult<SyncReport> {
        let rows = self.repository.attendance.fetch_unsynced().await?;
        if rows.is_empty() {
            return Ok(SyncReport::nothing());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let batch: Vec<AttendancePush> = rows.iter().map(AttendancePush::from).collect();
        let count = batch.len() as i64;

        match self.remote.push_attendance(batch).await {
            Ok(()) => {
                self.repository.attendance.mark_synced(&ids).await?;
                let report = SyncReport::synced(count, "attendance records");
                self.audit(count, true, &report.message).await?;
                Ok(report)
            }
            Err(e) => {
                let message = format!("attendance push failed: {}", e);
                tracing::warn!("{}", message);
                self.audit(0, false, &message).await?;
                Ok(SyncReport::failed(message))
            }
        }
    }

    /// Push unsynced inventory counts, one request per count (the remote
    /// endpoint takes a single count). Each acknowledged count is flipped
    /// individually, so a mid-pass failure retries only the remainder.
    pub async fn push_inventory(&self) -> AppResult<SyncReport> {
        let counts = self.repository.inventory.fetch_unsynced().await?;
        if counts.is_empty() {
            return Ok(SyncReport::nothing());
        }

        let mut pushed: i64 = 0;
        let mut failure: Option<RemoteError> = None;

        for count in &counts {
            let items = self.repository.inventory.items_for(count.id).await?;
            match self
                .remote
                .push_inventory_count(InventoryCountPush::new(count, &items))
                .await
            {
                Ok(()) => {
                    self.repository.inventory.mark_synced(count.id).await?;
                    pushed += 1;
                }
                Err(e) => {
                    // the endpoint is down; the rest would fail the same way
                    failure = Some(e);
                    break;
                }
            }
        }

        match failure {
            None => {
                let report = SyncReport::synced(pushed, "inventory counts");
                self.audit(pushed, true, &report.message).await?;
                Ok(report)
            }
            Some(e) => {
                let message = format!("inventory push failed after {} counts: {}", pushed, e);
                tracing::warn!("{}", message);
                self.audit(pushed, false, &message).await?;
                Ok(SyncReport::failed(message))
            }
        }
    }

    /// Pull the authoritative roster, admin PIN and product catalog. Each
    /// endpoint is tried independently so one failing pull does not starve
    /// the others. Pulls do not write audit entries; failures surface in the
    /// log only.
    pub async fn pull_reference(&self) -> AppResult<SyncReport> {
        let mut pulled: i64 = 0;
        let mut failures: Vec<String> = Vec::new();
        let now = Utc::now();

        match self.remote.fetch_employees().await {
            Ok(employees) => {
                for emp in &employees {
                    self.repository.employees.upsert_from_remote(emp, now).await?;
                }
                pulled += employees.len() as i64;
                tracing::debug!(count = employees.len(), "employee roster refreshed");
            }
            Err(e) => failures.push(format!("employees: {}", e)),
        }

        match self.remote.fetch_kiosk_pin().await {
            Ok(remote_pin) => {
                if let Some(pin) = remote_pin.pin {
                    self.repository.settings.set(ADMIN_PIN_KEY, &pin).await?;
                }
            }
            Err(e) => failures.push(format!("kiosk pin: {}", e)),
        }

        match self.remote.fetch_products().await {
            Ok(products) => {
                pulled += products.len() as i64;
                self.repository.products.replace_all(&products).await?;
                tracing::debug!("product catalog replaced");
            }
            Err(e) => failures.push(format!("products: {}", e)),
        }

        if failures.is_empty() {
            Ok(SyncReport::synced(pulled, "reference records"))
        } else {
            let message = format!("reference pull incomplete: {}", failures.join("; "));
            tracing::warn!("{}", message);
            Ok(SyncReport::failed(message))
        }
    }

    /// Manual "sync now": one push pass, on demand.
    pub async fn sync_now(&self) -> AppResult<SyncReport> {
        if !self.connectivity.has_connectivity().await {
            return Ok(SyncReport::failed("no internet connection".to_string()));
        }

        let attendance = self.push_attendance().await?;
        let inventory = self.push_inventory().await?;
        Ok(attendance.merge(inventory))
    }

    /// Manual roster/catalog refresh
    pub async fn refresh_reference(&self) -> AppResult<SyncReport> {
        if !self.connectivity.has_connectivity().await {
            return Ok(SyncReport::failed("no internet connection".to_string()));
        }

        self.pull_reference().await
    }

    /// Passive status for the UI: aggregate unsynced counter plus the most
    /// recent audit entry.
    pub async fn sync_status(&self) -> AppResult<SyncStatus> {
        let unsynced = self.repository.attendance.count_unsynced().await?
            + self.repository.inventory.count_unsynced().await?;
        let last = self.repository.sync_log.last().await?;

        Ok(SyncStatus {
            unsynced_count: unsynced,
            last,
        })
    }

    /// Most recent audit entries for the admin view
    pub async fn recent_log(&self, limit: i64) -> AppResult<Vec<crate::models::sync::SyncAuditEntry>> {
        self.repository.sync_log.recent(limit).await
    }

    async fn audit(&self, records: i64, success: bool, message: &str) -> AppResult<()> {
        self.repository
            .sync_log
            .append(Utc::now(), records, success, message, self.config.audit_history)
            .await
    }
}
