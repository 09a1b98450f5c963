#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use device_registry::application::services::DeviceService;
use device_registry::config::{Config, StorageBackend};
use device_registry::domain::entities::{Device, DeviceState};
use device_registry::domain::repositories::DeviceRepository;
use device_registry::infrastructure::persistence::InMemoryDeviceRepository;
use device_registry::observability::AppMetrics;
use device_registry::routes::app_router;
use device_registry::state::AppState;
use std::sync::Arc;

pub const BASE_URL: &str = "http://localhost:8080";

/// Creation time shared by all fixtures: 2023-10-01T12:00:00Z.
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 1, 12, 0, 0).unwrap()
}

pub fn device(id: i64, name: &str, brand: &str, state: DeviceState) -> Device {
    Device::new(id, name.to_string(), brand.to_string(), state, fixture_time())
}

/// The four devices every contract and handler test starts from.
pub fn standard_fixture() -> Vec<Device> {
    vec![
        device(1, "Test Device", "Test Brand", DeviceState::Available),
        device(2, "Test Device 2", "Another Brand", DeviceState::InUse),
        device(3, "Test Device 3", "Test Brand", DeviceState::Inactive),
        device(4, "Test Device 4", "Another Brand", DeviceState::Available),
    ]
}

pub fn test_config() -> Config {
    Config {
        storage: StorageBackend::Memory,
        public_base_url: Some(BASE_URL.to_string()),
        ..Config::default()
    }
}

pub async fn seeded_repository(devices: Vec<Device>) -> Arc<InMemoryDeviceRepository> {
    let repository = Arc::new(InMemoryDeviceRepository::new());
    for device in devices {
        repository.insert(device).await;
    }
    repository
}

pub fn create_test_state(repository: Arc<dyn DeviceRepository>, config: &Config) -> AppState {
    let device_service = Arc::new(DeviceService::new(repository));
    let metrics = Arc::new(AppMetrics::new().unwrap());
    AppState::new(device_service, metrics, config)
}

/// Full application router over an in-memory store holding `devices`.
pub async fn make_server(devices: Vec<Device>) -> TestServer {
    make_server_with_config(devices, &test_config()).await
}

pub async fn make_server_with_config(devices: Vec<Device>, config: &Config) -> TestServer {
    let repository = seeded_repository(devices).await;
    let state = create_test_state(repository, config);
    TestServer::new(app_router(state)).unwrap()
}
