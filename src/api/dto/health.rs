//! DTOs for the actuator endpoints.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

pub const STATUS_UP: &str = "UP";
pub const STATUS_DOWN: &str = "DOWN";

/// Aggregated health with per-component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "UP")]
    pub status: String,
    pub version: String,
    pub components: HealthComponents,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthComponents {
    pub db: ComponentHealth,
}

/// Health of a single component.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,

    #[schema(value_type = Object)]
    pub details: Value,
}

impl ComponentHealth {
    pub fn is_up(&self) -> bool {
        self.status == STATUS_UP
    }
}

/// Static application information.
#[derive(Debug, Serialize, ToSchema)]
pub struct InfoResponse {
    #[schema(example = "device-registry")]
    pub name: String,
    pub version: String,
    pub description: String,
    #[schema(example = "postgres")]
    pub storage: String,
}
