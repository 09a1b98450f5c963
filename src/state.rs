use std::sync::Arc;

use crate::application::services::DeviceService;
use crate::config::{Config, StorageBackend};
use crate::observability::AppMetrics;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub device_service: Arc<DeviceService>,
    pub metrics: Arc<AppMetrics>,
    /// Fixed base for `_links`; `None` derives it from each request.
    pub public_base_url: Option<String>,
    pub max_page_size: u32,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(device_service: Arc<DeviceService>, metrics: Arc<AppMetrics>, config: &Config) -> Self {
        Self {
            device_service,
            metrics,
            public_base_url: config.public_base_url.clone(),
            max_page_size: config.max_page_size,
            storage: config.storage,
        }
    }
}
