//! OpenAPI document assembled from handler annotations.

use utoipa::OpenApi;

use crate::api::dto::device::{
    DeviceLinks, DeviceModel, DevicePatchRequest, DeviceRequest, EmbeddedDevices, PageLinks,
    PageMetadata, PagedDevicesModel,
};
use crate::api::dto::health::{ComponentHealth, HealthComponents, HealthResponse, InfoResponse};
use crate::api::hal::Link;
use crate::api::handlers::{actuator, devices};
use crate::error::{ErrorBody, ErrorInfo};

/// Served at `/v3/api-docs`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        devices::create_device,
        devices::get_device,
        devices::list_devices,
        devices::replace_device,
        devices::patch_device,
        devices::delete_device,
        actuator::health,
        actuator::info,
        actuator::prometheus,
    ),
    components(schemas(
        DeviceRequest,
        DevicePatchRequest,
        DeviceModel,
        DeviceLinks,
        PagedDevicesModel,
        EmbeddedDevices,
        PageLinks,
        PageMetadata,
        Link,
        HealthResponse,
        HealthComponents,
        ComponentHealth,
        InfoResponse,
        ErrorBody,
        ErrorInfo,
    )),
    tags(
        (name = "Device Management", description = "Register, query, update and retire devices"),
        (name = "Actuator", description = "Health, build info and metrics")
    ),
    info(
        title = "Device Registry API",
        description = "REST API for managing device resources, with HAL hypermedia responses"
    )
)]
pub struct ApiDoc;
