//! API route configuration.

use crate::api::handlers::{
    actuator, create_device, delete_device, get_device, list_devices, patch_device,
    replace_device,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Device resource routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `GET    /devices`       - List devices (filter by brand/state, paginated)
/// - `POST   /devices`       - Register a device
/// - `GET    /devices/{id}`  - Fetch a device
/// - `PUT    /devices/{id}`  - Replace a device
/// - `PATCH  /devices/{id}`  - Partially update a device
/// - `DELETE /devices/{id}`  - Delete a device that is not in use
pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices).post(create_device))
        .route(
            "/devices/{id}",
            get(get_device)
                .put(replace_device)
                .patch(patch_device)
                .delete(delete_device),
        )
}

/// Operational routes, nested under `/actuator`.
pub fn actuator_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(actuator::health))
        .route("/info", get(actuator::info))
        .route("/prometheus", get(actuator::prometheus))
}
