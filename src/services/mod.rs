//! Business logic services

pub mod attendance;
pub mod device;
pub mod inventory;
pub mod sync;

use std::sync::Arc;

use crate::{
    cloud::{Connectivity, RemoteApi},
    config::SyncConfig,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub device: device::DeviceService,
    pub attendance: attendance::AttendanceService,
    pub inventory: inventory::InventoryService,
    pub sync: Arc<sync::SyncEngine>,
}

impl Services {
    /// Create all services with the given repository and cloud boundary
    pub fn new(
        repository: Repository,
        remote: Arc<dyn RemoteApi>,
        connectivity: Arc<dyn Connectivity>,
        sync_config: SyncConfig,
    ) -> Self {
        let device = device::DeviceService::new(repository.clone(), Arc::clone(&remote));
        Self {
            attendance: attendance::AttendanceService::new(repository.clone(), device.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            sync: Arc::new(sync::SyncEngine::new(
                repository,
                remote,
                connectivity,
                sync_config,
            )),
            device,
        }
    }
}
