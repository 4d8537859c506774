//! Repository layer for database operations

pub mod attendance;
pub mod employees;
pub mod inventory;
pub mod products;
pub mod settings;
pub mod sync_log;

use sqlx::{Pool, Sqlite};

/// Main repository struct holding the local store's connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub employees: employees::EmployeesRepository,
    pub attendance: attendance::AttendanceRepository,
    pub inventory: inventory::InventoryRepository,
    pub products: products::ProductsRepository,
    pub settings: settings::SettingsRepository,
    pub sync_log: sync_log::SyncLogRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            employees: employees::EmployeesRepository::new(pool.clone()),
            attendance: attendance::AttendanceRepository::new(pool.clone()),
            inventory: inventory::InventoryRepository::new(pool.clone()),
            products: products::ProductsRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            sync_log: sync_log::SyncLogRepository::new(pool.clone()),
            pool,
        }
    }
}
