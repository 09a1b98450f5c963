//! Operational endpoints under `/actuator`.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::health::{
    ComponentHealth, HealthComponents, HealthResponse, InfoResponse, STATUS_DOWN, STATUS_UP,
};
use crate::error::AppError;
use crate::observability::PROMETHEUS_CONTENT_TYPE;
use crate::state::AppState;

/// Reports service health.
///
/// Returns **200** with `status: UP` when the store answers, **503** with
/// `status: DOWN` otherwise.
///
/// ```json
/// {
///   "status": "UP",
///   "version": "0.1.0",
///   "components": { "db": { "status": "UP", "details": { "storage": "postgres" } } }
/// }
/// ```
#[utoipa::path(
    get,
    path = "/actuator/health",
    tag = "Actuator",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "A component is down", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db = check_database(&state).await;
    let up = db.is_up();

    let response = HealthResponse {
        status: if up { STATUS_UP } else { STATUS_DOWN }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: HealthComponents { db },
    };

    let status = if up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

async fn check_database(state: &AppState) -> ComponentHealth {
    match state.device_service.health_check().await {
        Ok(()) => ComponentHealth {
            status: STATUS_UP.to_string(),
            details: json!({ "storage": state.storage.as_str() }),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            ComponentHealth {
                status: STATUS_DOWN.to_string(),
                details: json!({ "storage": state.storage.as_str(), "error": e.to_string() }),
            }
        }
    }
}

/// Static build information.
#[utoipa::path(
    get,
    path = "/actuator/info",
    tag = "Actuator",
    responses((status = 200, description = "Application info", body = InfoResponse))
)]
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
        storage: state.storage.as_str().to_string(),
    })
}

/// Prometheus scrape endpoint.
#[utoipa::path(
    get,
    path = "/actuator/prometheus",
    tag = "Actuator",
    responses((status = 200, description = "Metrics in Prometheus text format", body = String, content_type = "text/plain"))
)]
pub async fn prometheus(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state.metrics.render().map_err(|e| {
        tracing::error!(error = %e, "Failed to encode metrics");
        AppError::internal("Failed to encode metrics", json!({}))
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response())
}
