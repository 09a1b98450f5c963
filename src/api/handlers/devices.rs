//! Handlers for the device resource (`/api/v1/devices`).

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::device::{DeviceModel, DevicePatchRequest, DeviceRequest, PagedDevicesModel};
use crate::api::dto::pagination::ListDevicesParams;
use crate::api::hal::{Hal, LinkBuilder};
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// PUT, PATCH and DELETE only address persisted ids.
fn require_positive_id(id: i64) -> Result<i64, AppError> {
    if id < 1 {
        return Err(AppError::bad_request(
            "Device ID must be a positive number",
            json!({ "id": id }),
        ));
    }
    Ok(id)
}

/// Registers a new device.
///
/// Responds `201 Created` with a `Location` header pointing at the new resource.
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    tag = "Device Management",
    request_body = DeviceRequest,
    responses(
        (status = 201, description = "Device created", body = DeviceModel, content_type = "application/hal+json"),
        (status = 400, description = "Invalid input data", body = ErrorBody)
    )
)]
pub async fn create_device(
    State(state): State<AppState>,
    links: LinkBuilder,
    payload: Result<Json<DeviceRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    tracing::debug!(?request, "Creating device");

    let device = state
        .device_service
        .create_device(request.into_new_device()?)
        .await?;

    let model = DeviceModel::from_device(&device, &links);
    let location = model.links.self_link.href.clone();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Hal(model),
    )
        .into_response())
}

/// Fetches a single device.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{id}",
    tag = "Device Management",
    params(("id" = i64, Path, description = "Device identifier")),
    responses(
        (status = 200, description = "Device found", body = DeviceModel, content_type = "application/hal+json"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Device not found", body = ErrorBody)
    )
)]
pub async fn get_device(
    State(state): State<AppState>,
    links: LinkBuilder,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Hal<DeviceModel>, AppError> {
    let Path(id) = id?;
    let device = state.device_service.get_device(id).await?;
    Ok(Hal(DeviceModel::from_device(&device, &links)))
}

/// Lists devices, optionally filtered by brand and state, one page at a time.
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Device Management",
    params(ListDevicesParams),
    responses(
        (status = 200, description = "Page of devices", body = PagedDevicesModel, content_type = "application/hal+json"),
        (status = 400, description = "Invalid filter or page parameters", body = ErrorBody)
    )
)]
pub async fn list_devices(
    State(state): State<AppState>,
    links: LinkBuilder,
    params: Result<Query<ListDevicesParams>, QueryRejection>,
) -> Result<Hal<PagedDevicesModel>, AppError> {
    let Query(params) = params?;
    let filter = params.to_filter()?;
    let page_request = params.to_page_request(state.max_page_size)?;
    tracing::debug!(?filter, ?page_request, "Listing devices");

    let page = state
        .device_service
        .list_devices(filter.clone(), page_request)
        .await?;

    Ok(Hal(PagedDevicesModel::from_page(page, &filter, &links)))
}

/// Replaces name, brand and state of a device.
///
/// An in-use device keeps its name and brand; only its state may change.
#[utoipa::path(
    put,
    path = "/api/v1/devices/{id}",
    tag = "Device Management",
    params(("id" = i64, Path, description = "Device identifier")),
    request_body = DeviceRequest,
    responses(
        (status = 200, description = "Device updated", body = DeviceModel, content_type = "application/hal+json"),
        (status = 400, description = "Invalid input or device in use", body = ErrorBody),
        (status = 404, description = "Device not found", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody)
    )
)]
pub async fn replace_device(
    State(state): State<AppState>,
    links: LinkBuilder,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DeviceRequest>, JsonRejection>,
) -> Result<Hal<DeviceModel>, AppError> {
    let Path(id) = id?;
    let id = require_positive_id(id)?;
    let Json(request) = payload?;
    tracing::debug!(id, ?request, "Replacing device");

    let device = state
        .device_service
        .update_device(id, request.into_update()?)
        .await?;

    Ok(Hal(DeviceModel::from_device(&device, &links)))
}

/// Changes only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/v1/devices/{id}",
    tag = "Device Management",
    params(("id" = i64, Path, description = "Device identifier")),
    request_body = DevicePatchRequest,
    responses(
        (status = 200, description = "Device updated", body = DeviceModel, content_type = "application/hal+json"),
        (status = 400, description = "Invalid input or device in use", body = ErrorBody),
        (status = 404, description = "Device not found", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody)
    )
)]
pub async fn patch_device(
    State(state): State<AppState>,
    links: LinkBuilder,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DevicePatchRequest>, JsonRejection>,
) -> Result<Hal<DeviceModel>, AppError> {
    let Path(id) = id?;
    let id = require_positive_id(id)?;
    let Json(request) = payload?;
    tracing::debug!(id, ?request, "Patching device");

    let device = state
        .device_service
        .update_device(id, request.into_update()?)
        .await?;

    Ok(Hal(DeviceModel::from_device(&device, &links)))
}

/// Deletes a device that is not in use.
#[utoipa::path(
    delete,
    path = "/api/v1/devices/{id}",
    tag = "Device Management",
    params(("id" = i64, Path, description = "Device identifier")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 400, description = "Invalid id or device in use", body = ErrorBody),
        (status = 404, description = "Device not found", body = ErrorBody)
    )
)]
pub async fn delete_device(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    let id = require_positive_id(id)?;

    state.device_service.delete_device(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
