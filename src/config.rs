//! Configuration management for the kiosk server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Remote system of record consumed by the sync engine.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Seconds between push cycles.
    pub interval_seconds: u64,
    /// Reference data is pulled every Nth cycle.
    pub pull_every_cycles: u32,
    /// Most-recent-N audit entries kept in the sync log.
    pub audit_history: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConnectivityConfig {
    pub primary_url: String,
    pub fallback_url: String,
    pub probe_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cloud: CloudConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix KIOSK_)
            .add_source(
                Environment::with_prefix("KIOSK")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override database URL from DATABASE_URL env var if present
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            // Override cloud credentials from env vars if present
            .set_override_option("cloud.api_key", env::var("SYNC_API_KEY").ok())?
            .set_override_option("cloud.base_url", env::var("CLOUD_BASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://attendance.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            pull_every_cycles: 10,
            audit_history: 100,
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            primary_url: "https://8.8.8.8".to_string(),
            fallback_url: "https://google.com".to_string(),
            probe_timeout_seconds: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
        }
    }
}
