//! Repository trait for device data access.

use crate::domain::entities::{Device, DeviceChanges, DeviceFilter, DeviceState, NewDevice, PageRequest};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing devices.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgDeviceRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryDeviceRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_device.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Inserts a device. The store assigns `id` and `created_on`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_device: NewDevice) -> Result<Device, AppError>;

    /// Finds a device by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Device))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: i64) -> Result<Option<Device>, AppError>;

    /// Returns one page of devices matching `filter`, ordered by id ascending.
    async fn find_page(
        &self,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> Result<Vec<Device>, AppError>;

    /// Counts devices matching `filter`.
    async fn count(&self, filter: &DeviceFilter) -> Result<i64, AppError>;

    /// Writes `changes` to the device, provided it still exists and is still in
    /// `expected_state`.
    ///
    /// Returns `Ok(None)` when no row matched; the caller decides whether the
    /// device vanished or was modified concurrently.
    async fn update(
        &self,
        id: i64,
        expected_state: DeviceState,
        changes: DeviceChanges,
    ) -> Result<Option<Device>, AppError>;

    /// Deletes the device unless it is in use.
    ///
    /// Returns `Ok(true)` if a row was removed, `Ok(false)` if the device does not
    /// exist or is currently in use.
    async fn delete_unless_in_use(&self, id: i64) -> Result<bool, AppError>;

    /// Verifies the backing store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
