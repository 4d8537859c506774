//! Connectivity probing
//!
//! Being offline is a normal operating state for the kiosk, so the probe
//! returns a plain bool and never errors.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ConnectivityConfig;

/// Binary up/down signal consumed by the sync engine.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn has_connectivity(&self) -> bool;
}

/// Cheap reachability check: one short-timeout GET against a well-known
/// address, one fallback HEAD against a second, false only if both fail.
pub struct HttpProber {
    client: reqwest::Client,
    primary_url: String,
    fallback_url: String,
}

impl HttpProber {
    pub fn new(config: &ConnectivityConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            primary_url: config.primary_url.clone(),
            fallback_url: config.fallback_url.clone(),
        }
    }
}

#[async_trait]
impl Connectivity for HttpProber {
    async fn has_connectivity(&self) -> bool {
        if self.client.get(&self.primary_url).send().await.is_ok() {
            return true;
        }
        self.client.head(&self.fallback_url).send().await.is_ok()
    }
}
