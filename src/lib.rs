//! Offline-first attendance and inventory kiosk server
//!
//! A site-local server that records punches and inventory counts in an
//! embedded store and reconciles them with a remote system of record
//! whenever connectivity allows.

use std::sync::Arc;

pub mod api;
pub mod cloud;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
