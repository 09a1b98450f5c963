//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/api/v1/devices*`   - Device resource (HAL JSON)
//! - `/actuator/*`        - Health, info and Prometheus metrics
//! - `GET /v3/api-docs`   - OpenAPI document
//! - `/swagger-ui`        - Interactive API documentation
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Metrics** - Request counts and latency per matched route

use crate::api;
use crate::api::middleware::{metrics, tracing};
use crate::api::openapi::ApiDoc;
use crate::state::AppState;
use axum::{Router, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::routes::device_routes())
        .nest("/actuator", api::routes::actuator_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), metrics::layer))
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs", ApiDoc::openapi()))
        .with_state(state)
        .layer(tracing::layer())
}
