//! Health check endpoint.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("healthy" if the stores answer, "degraded" otherwise).
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Number of metrics in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_metrics: Option<usize>,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Always answers 200 so load balancers can tell the process is up; a
/// poisoned catalog lock shows up as "degraded".
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog_metrics = state.catalog().count().ok();
    Json(HealthResponse {
        status: if catalog_metrics.is_some() {
            "healthy"
        } else {
            "degraded"
        },
        service: "flowdeck-api",
        version: env!("CARGO_PKG_VERSION"),
        catalog_metrics,
    })
}
