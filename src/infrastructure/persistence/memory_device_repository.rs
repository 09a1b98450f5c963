//! Process-local device repository.
//!
//! Backs `STORAGE=memory` runs and the HTTP integration tests. Ids are assigned
//! sequentially from 1 and never reused, matching a `BIGSERIAL` column.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::entities::{
    Device, DeviceChanges, DeviceFilter, DeviceState, NewDevice, PageRequest,
};
use crate::domain::repositories::DeviceRepository;
use crate::error::AppError;

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    devices: BTreeMap<i64, Device>,
}

#[derive(Debug, Default)]
pub struct InMemoryDeviceRepository {
    store: RwLock<Store>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully specified device, keeping its id and creation time.
    ///
    /// Used to load fixtures whose timestamps must be stable.
    pub async fn insert(&self, device: Device) {
        let mut store = self.store.write().await;
        store.last_id = store.last_id.max(device.id);
        store.devices.insert(device.id, device);
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.devices.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn create(&self, new_device: NewDevice) -> Result<Device, AppError> {
        let mut store = self.store.write().await;
        store.last_id += 1;

        let device = Device::new(
            store.last_id,
            new_device.name,
            new_device.brand,
            new_device.state,
            Utc::now(),
        );
        store.devices.insert(device.id, device.clone());

        Ok(device)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Device>, AppError> {
        Ok(self.store.read().await.devices.get(&id).cloned())
    }

    async fn find_page(
        &self,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> Result<Vec<Device>, AppError> {
        let store = self.store.read().await;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);

        Ok(store
            .devices
            .values()
            .filter(|d| filter.matches(&d.brand, d.state))
            .skip(offset)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &DeviceFilter) -> Result<i64, AppError> {
        let store = self.store.read().await;
        let count = store
            .devices
            .values()
            .filter(|d| filter.matches(&d.brand, d.state))
            .count();

        Ok(count as i64)
    }

    async fn update(
        &self,
        id: i64,
        expected_state: DeviceState,
        changes: DeviceChanges,
    ) -> Result<Option<Device>, AppError> {
        let mut store = self.store.write().await;

        let Some(device) = store.devices.get_mut(&id) else {
            return Ok(None);
        };
        if device.state != expected_state {
            return Ok(None);
        }

        device.name = changes.name;
        device.brand = changes.brand;
        device.state = changes.state;

        Ok(Some(device.clone()))
    }

    async fn delete_unless_in_use(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.store.write().await;

        match store.devices.get(&id) {
            Some(device) if !device.is_in_use() => {
                store.devices.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
