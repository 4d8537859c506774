//! Device-binding authority
//!
//! A physical device may act on behalf of exactly one employee. The binding
//! is granted locally against the employee's PIN and propagated to the cloud
//! best-effort: the local grant is authoritative for same-site operation, so
//! a failed propagation is logged and retried implicitly by the
//! `device_synced` merge rule on the next reference pull.

use std::sync::Arc;

use crate::{
    cloud::RemoteApi,
    error::{AppError, AppResult},
    models::employee::DeviceBinding,
    repository::Repository,
};

#[derive(Clone)]
pub struct DeviceService {
    repository: Repository,
    remote: Arc<dyn RemoteApi>,
}

impl DeviceService {
    pub fn new(repository: Repository, remote: Arc<dyn RemoteApi>) -> Self {
        Self { repository, remote }
    }

    /// Bind `device_id` to an employee after a PIN claim.
    ///
    /// A bound employee cannot silently migrate devices; an administrator
    /// must unlink first.
    pub async fn link(
        &self,
        employee_id: i64,
        pin: &str,
        device_id: &str,
    ) -> AppResult<DeviceBinding> {
        let employee = self
            .repository
            .employees
            .find_active(employee_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

        match employee.pin_code.as_deref() {
            Some(stored) if stored == pin => {}
            _ => return Err(AppError::PinMismatch),
        }

        if let Some(bound) = employee.device_id.as_deref() {
            if bound != device_id {
                return Err(AppError::AlreadyBoundElsewhere);
            }
        }

        self.repository
            .employees
            .set_device(employee_id, Some(device_id), false)
            .await?;
        self.propagate(employee_id, Some(device_id.to_string()));

        tracing::info!(employee_id, device_id, "device linked");

        Ok(DeviceBinding {
            employee_id,
            employee_name: employee.name,
            device_id: device_id.to_string(),
        })
    }

    /// True iff the employee is active and bound to exactly this device.
    /// Cheap gate for PIN-free punches; a missing employee is simply false.
    pub async fn verify(&self, employee_id: i64, device_id: &str) -> AppResult<bool> {
        let verified = self
            .repository
            .employees
            .find_active(employee_id)
            .await?
            .map(|e| e.device_id.as_deref() == Some(device_id))
            .unwrap_or(false);

        Ok(verified)
    }

    /// Clear a binding. Administrator-only, gated by the cached admin PIN.
    pub async fn unlink(&self, employee_id: i64, admin_pin: &str) -> AppResult<()> {
        let expected = self.repository.settings.admin_pin().await?;
        if admin_pin != expected {
            return Err(AppError::Unauthorized("admin PIN rejected".to_string()));
        }

        // Inactive employees can still be unlinked by an administrator
        self.repository.employees.get_by_id(employee_id).await?;
        self.repository
            .employees
            .set_device(employee_id, None, false)
            .await?;
        self.propagate(employee_id, None);

        tracing::info!(employee_id, "device unlinked");

        Ok(())
    }

    /// Fire-and-forget propagation of a binding change. Never blocks the
    /// caller's response; a success flips the acknowledgement flag so the
    /// next reference pull may overwrite the binding again.
    fn propagate(&self, employee_id: i64, device_id: Option<String>) {
        let repository = self.repository.clone();
        let remote = Arc::clone(&self.remote);

        tokio::spawn(async move {
            match remote.update_employee_device(employee_id, device_id).await {
                Ok(()) => {
                    if let Err(e) = repository.employees.mark_device_synced(employee_id).await {
                        tracing::error!(employee_id, error = %e, "failed to record binding ack");
                    }
                }
                Err(e) => {
                    tracing::warn!(employee_id, error = %e, "binding propagation failed");
                }
            }
        });
    }
}
