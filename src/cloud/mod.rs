//! Outbound boundary to the remote system of record.
//!
//! All network I/O the kiosk ever performs goes through the [`RemoteApi`]
//! trait (so the sync engine can be exercised against a mock) and the
//! [`Connectivity`] probe. Every call carries the bearer credential from
//! configuration and a bounded timeout.

pub mod connectivity;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::CloudConfig;
use crate::models::remote::{
    AttendancePush, DeviceBindingUpdate, InventoryCountPush, RemoteEmployee, RemoteKioskPin,
    RemoteProduct,
};

pub use connectivity::{Connectivity, HttpProber};

/// Failures on the cloud path. These never reach a request handler; the sync
/// engine absorbs them into the audit trail and retries next cycle.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server rejected request: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout
        } else if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

/// The remote REST contract consumed by the sync engine.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// `POST /attendance/sync` with one batch of unsynced rows
    async fn push_attendance(&self, batch: Vec<AttendancePush>) -> Result<(), RemoteError>;

    /// `POST /inventory-counts` with one captured count
    async fn push_inventory_count(&self, count: InventoryCountPush) -> Result<(), RemoteError>;

    /// `GET /employees`: authoritative roster
    async fn fetch_employees(&self) -> Result<Vec<RemoteEmployee>, RemoteError>;

    /// `GET /settings/kiosk-pin`: admin access PIN
    async fn fetch_kiosk_pin(&self) -> Result<RemoteKioskPin, RemoteError>;

    /// `GET /products`: full product catalog
    async fn fetch_products(&self) -> Result<Vec<RemoteProduct>, RemoteError>;

    /// `PUT /employees/{id}`: partial update propagating a device binding
    async fn update_employee_device(
        &self,
        employee_id: i64,
        device_id: Option<String>,
    ) -> Result<(), RemoteError>;
}

/// reqwest-backed client for the cloud REST API
pub struct CloudClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CloudClient {
    pub fn new(config: &CloudConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a `Status` error with a truncated body.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let mut body = resp.text().await.unwrap_or_default();
        body.truncate(200);
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RemoteApi for CloudClient {
    async fn push_attendance(&self, batch: Vec<AttendancePush>) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(self.url("/attendance/sync"))
            .bearer_auth(&self.api_key)
            .json(&batch)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn push_inventory_count(&self, count: InventoryCountPush) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(self.url("/inventory-counts"))
            .bearer_auth(&self.api_key)
            .json(&count)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn fetch_employees(&self) -> Result<Vec<RemoteEmployee>, RemoteError> {
        let resp = self
            .client
            .get(self.url("/employees"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let employees = Self::check(resp)
            .await?
            .json::<Vec<RemoteEmployee>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(employees)
    }

    async fn fetch_kiosk_pin(&self) -> Result<RemoteKioskPin, RemoteError> {
        let resp = self
            .client
            .get(self.url("/settings/kiosk-pin"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let pin = Self::check(resp)
            .await?
            .json::<RemoteKioskPin>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(pin)
    }

    async fn fetch_products(&self) -> Result<Vec<RemoteProduct>, RemoteError> {
        let resp = self
            .client
            .get(self.url("/products"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let products = Self::check(resp)
            .await?
            .json::<Vec<RemoteProduct>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(products)
    }

    async fn update_employee_device(
        &self,
        employee_id: i64,
        device_id: Option<String>,
    ) -> Result<(), RemoteError> {
        let resp = self
            .client
            .put(self.url(&format!("/employees/{}", employee_id)))
            .bearer_auth(&self.api_key)
            .json(&DeviceBindingUpdate { device_id })
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
