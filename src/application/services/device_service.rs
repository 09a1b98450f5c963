//! Device registration and lifecycle service.

use std::sync::Arc;

use crate::domain::entities::{
    Device, DeviceFilter, DeviceUpdate, NewDevice, Page, PageRequest,
};
use crate::domain::repositories::DeviceRepository;
use crate::error::AppError;
use serde_json::json;

/// Service enforcing the device lifecycle rules.
///
/// A device that is in use is locked: its name and brand cannot change and it
/// cannot be deleted. Its state can still change, which is how it gets released.
pub struct DeviceService<R: DeviceRepository + ?Sized = dyn DeviceRepository> {
    repository: Arc<R>,
}

impl<R: DeviceRepository + ?Sized> DeviceService<R> {
    /// Creates a new device service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Registers a new device.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create_device(&self, new_device: NewDevice) -> Result<Device, AppError> {
        let device = self.repository.create(new_device).await?;
        tracing::info!(id = device.id, brand = %device.brand, state = %device.state, "Device created");
        Ok(device)
    }

    /// Retrieves a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no device has this id.
    pub async fn get_device(&self, id: i64) -> Result<Device, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| device_not_found(id))
    }

    /// Returns one page of devices matching `filter`.
    ///
    /// The page and the total count are fetched concurrently.
    pub async fn list_devices(
        &self,
        filter: DeviceFilter,
        page: PageRequest,
    ) -> Result<Page<Device>, AppError> {
        let (items, total) = tokio::try_join!(
            self.repository.find_page(&filter, page),
            self.repository.count(&filter)
        )?;

        Ok(Page::new(items, page, total))
    }

    /// Applies `update` to the device with `id`.
    ///
    /// Fields left as `None` keep their stored value; the creation time never
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the device does not exist.
    /// Returns [`AppError::RuleViolation`] if the device is in use and the update
    /// changes its brand or name.
    /// Returns [`AppError::Conflict`] if the device changed state while the
    /// update was being applied.
    pub async fn update_device(&self, id: i64, update: DeviceUpdate) -> Result<Device, AppError> {
        let current = self.get_device(id).await?;

        if current.is_in_use() {
            if update.brand.as_ref().is_some_and(|b| *b != current.brand) {
                return Err(AppError::rule_violation(
                    "Cannot update brand of device that is in use",
                    json!({ "id": id }),
                ));
            }
            if update.name.as_ref().is_some_and(|n| *n != current.name) {
                return Err(AppError::rule_violation(
                    "Cannot update name of device that is in use",
                    json!({ "id": id }),
                ));
            }
        }

        let changes = update.resolve(&current);

        match self.repository.update(id, current.state, changes).await? {
            Some(device) => {
                tracing::info!(id, state = %device.state, "Device updated");
                Ok(device)
            }
            None => match self.repository.find_by_id(id).await? {
                None => Err(device_not_found(id)),
                Some(_) => Err(AppError::conflict(
                    "Device was modified concurrently, retry the request",
                    json!({ "id": id }),
                )),
            },
        }
    }

    /// Deletes the device with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the device does not exist.
    /// Returns [`AppError::RuleViolation`] if the device is in use.
    pub async fn delete_device(&self, id: i64) -> Result<(), AppError> {
        let current = self.get_device(id).await?;
        if current.is_in_use() {
            return Err(in_use_delete(id));
        }

        if self.repository.delete_unless_in_use(id).await? {
            tracing::info!(id, "Device deleted");
            return Ok(());
        }

        match self.repository.find_by_id(id).await? {
            None => Err(device_not_found(id)),
            Some(device) if device.is_in_use() => Err(in_use_delete(id)),
            Some(_) => Err(AppError::conflict(
                "Device was modified concurrently, retry the request",
                json!({ "id": id }),
            )),
        }
    }

    /// Checks that the backing store is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}

fn device_not_found(id: i64) -> AppError {
    AppError::not_found(
        format!("Device with ID {} does not exist", id),
        json!({ "id": id }),
    )
}

fn in_use_delete(id: i64) -> AppError {
    AppError::rule_violation("Cannot delete device that is in use", json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DeviceChanges, DeviceState};
    use crate::domain::repositories::MockDeviceRepository;
    use chrono::{Duration, Utc};

    fn test_device() -> Device {
        Device::new(
            1,
            "Test Device".to_string(),
            "Test Brand".to_string(),
            DeviceState::Available,
            Utc::now() - Duration::days(1),
        )
    }

    fn in_use_device() -> Device {
        Device::new(
            2,
            "In Use Device".to_string(),
            "Test Brand".to_string(),
            DeviceState::InUse,
            Utc::now() - Duration::days(1),
        )
    }

    fn service(repo: MockDeviceRepository) -> DeviceService<MockDeviceRepository> {
        DeviceService::new(Arc::new(repo))
    }

    fn apply(current: &Device, changes: DeviceChanges) -> Device {
        Device::new(
            current.id,
            changes.name,
            changes.brand,
            changes.state,
            current.created_on,
        )
    }

    #[tokio::test]
    async fn test_create_device() {
        let mut repo = MockDeviceRepository::new();
        let created = test_device();
        repo.expect_create()
            .withf(|d| d.name == "New Device" && d.state == DeviceState::Available)
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let result = service(repo)
            .create_device(NewDevice {
                name: "New Device".to_string(),
                brand: "New Brand".to_string(),
                state: DeviceState::Available,
            })
            .await
            .unwrap();

        assert_eq!(result.id, 1);
    }

    #[tokio::test]
    async fn test_get_device_when_exists() {
        let mut repo = MockDeviceRepository::new();
        let device = test_device();
        let expected = device.clone();
        repo.expect_find_by_id()
            .withf(|id| *id == 1)
            .returning(move |_| Ok(Some(device.clone())));

        let result = service(repo).get_device(1).await.unwrap();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_get_device_when_missing() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo).get_device(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(err.to_string().contains("Device with ID 1 does not exist"));
    }

    #[tokio::test]
    async fn test_list_devices_builds_page() {
        let mut repo = MockDeviceRepository::new();
        let device = test_device();
        repo.expect_find_page()
            .withf(|f, p| f.brand.as_deref() == Some("Test Brand") && p.page == 1 && p.size == 1)
            .returning(move |_, _| Ok(vec![device.clone()]));
        repo.expect_count().returning(|_| Ok(3));

        let page = service(repo)
            .list_devices(
                DeviceFilter::new().with_brand(Some("Test Brand")),
                PageRequest::new(1, 1),
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[tokio::test]
    async fn test_update_device_when_not_in_use() {
        let mut repo = MockDeviceRepository::new();
        let existing = test_device();
        let stored = existing.clone();
        repo.expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update()
            .withf(|id, expected, changes| {
                *id == 1
                    && *expected == DeviceState::Available
                    && changes.name == "Updated Name"
                    && changes.state == DeviceState::Inactive
            })
            .times(1)
            .returning(move |_, _, changes| Ok(Some(apply(&existing, changes))));

        let result = service(repo)
            .update_device(
                1,
                DeviceUpdate {
                    name: Some("Updated Name".to_string()),
                    brand: Some("Updated Brand".to_string()),
                    state: Some(DeviceState::Inactive),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.name, "Updated Name");
        assert_eq!(result.brand, "Updated Brand");
        assert_eq!(result.state, DeviceState::Inactive);
    }

    #[tokio::test]
    async fn test_update_in_use_device_changing_name_is_rejected() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(in_use_device())));
        repo.expect_update().times(0);

        let err = service(repo)
            .update_device(
                2,
                DeviceUpdate {
                    name: Some("Updated Name".to_string()),
                    brand: Some("Test Brand".to_string()),
                    state: Some(DeviceState::InUse),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RuleViolation { .. }));
        assert!(err
            .to_string()
            .contains("Cannot update name of device that is in use"));
    }

    #[tokio::test]
    async fn test_update_in_use_device_changing_brand_is_rejected() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(in_use_device())));
        repo.expect_update().times(0);

        let err = service(repo)
            .update_device(
                2,
                DeviceUpdate {
                    name: Some("In Use Device".to_string()),
                    brand: Some("Updated Brand".to_string()),
                    state: Some(DeviceState::InUse),
                },
            )
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .contains("Cannot update brand of device that is in use"));
    }

    #[tokio::test]
    async fn test_update_in_use_device_state_only_is_allowed() {
        let mut repo = MockDeviceRepository::new();
        let existing = in_use_device();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(in_use_device())));
        repo.expect_update()
            .withf(|_, expected, changes| {
                *expected == DeviceState::InUse
                    && changes.state == DeviceState::Available
                    && changes.name == "In Use Device"
            })
            .times(1)
            .returning(move |_, _, changes| Ok(Some(apply(&existing, changes))));

        let result = service(repo)
            .update_device(
                2,
                DeviceUpdate {
                    state: Some(DeviceState::Available),
                    ..DeviceUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.state, DeviceState::Available);
    }

    #[tokio::test]
    async fn test_update_device_when_missing() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo)
            .update_device(1, DeviceUpdate::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(err.to_string().contains("Device with ID 1 does not exist"));
    }

    #[tokio::test]
    async fn test_update_detects_concurrent_state_change() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id()
            .times(2)
            .returning(|_| Ok(Some(test_device())));
        repo.expect_update().returning(|_, _, _| Ok(None));

        let err = service(repo)
            .update_device(
                1,
                DeviceUpdate {
                    name: Some("Renamed".to_string()),
                    ..DeviceUpdate::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_device_when_not_in_use() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(test_device())));
        repo.expect_delete_unless_in_use()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(repo).delete_device(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_device_when_in_use() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(in_use_device())));
        repo.expect_delete_unless_in_use().times(0);

        let err = service(repo).delete_device(2).await.unwrap_err();
        assert!(matches!(err, AppError::RuleViolation { .. }));
        assert!(err.to_string().contains("Cannot delete device that is in use"));
    }

    #[tokio::test]
    async fn test_delete_device_when_missing() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete_unless_in_use().times(0);

        let err = service(repo).delete_device(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(err.to_string().contains("Device with ID 1 does not exist"));
    }

    #[tokio::test]
    async fn test_delete_loses_race_to_checkout() {
        let mut repo = MockDeviceRepository::new();
        let mut calls = 0;
        repo.expect_find_by_id().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(test_device()))
            } else {
                Ok(Some(in_use_device()))
            }
        });
        repo.expect_delete_unless_in_use().returning(|_| Ok(false));

        let err = service(repo).delete_device(1).await.unwrap_err();
        assert!(matches!(err, AppError::RuleViolation { .. }));
    }

    #[tokio::test]
    async fn test_health_check_delegates_to_ping() {
        let mut repo = MockDeviceRepository::new();
        repo.expect_ping().times(1).returning(|| Ok(()));

        assert!(service(repo).health_check().await.is_ok());
    }
}
