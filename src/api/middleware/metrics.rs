//! Request metrics middleware.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::state::AppState;

/// Counts requests and records their latency, labelled by the matched route
/// template (`/api/v1/devices/{id}`) rather than the raw path.
///
/// Install with `route_layer` so only matched routes are observed:
///
/// ```rust,ignore
/// let app = Router::new()
///     .nest("/api/v1", api_routes())
///     .route_layer(middleware::from_fn_with_state(state.clone(), metrics::layer));
/// ```
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = req.method().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    state.metrics.observe_request(
        &method,
        &route,
        response.status().as_u16(),
        started.elapsed(),
    );
    response
}
