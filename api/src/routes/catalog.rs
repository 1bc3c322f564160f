//! Metric catalog and label endpoints.

use super::error::{api_error, json_body, store_error, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{Metric, MetricKind};
use shared::storage::CatalogQuery;

/// Request for registering metrics: a single definition or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MetricRegisterRequest {
    /// A single metric.
    Single(Metric),
    /// A batch of metrics.
    Batch(Vec<Metric>),
}

/// Response for metric registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricRegisterResponse {
    /// Number of metrics stored.
    pub accepted: usize,
    /// Message describing the result.
    pub message: String,
}

/// Query parameters for listing metrics.
#[derive(Debug, Deserialize)]
pub struct MetricListParams {
    /// Kind filter, as a string so unknown kinds get a clear error.
    pub kind: Option<String>,
    /// Case-insensitive search over key and display name.
    pub search: Option<String>,
}

/// Response for metric listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricListResponse {
    /// Matching metrics, ordered by key.
    pub metrics: Vec<Metric>,
    /// Number of matching metrics.
    pub total_count: usize,
}

/// Query parameters for label listing.
#[derive(Debug, Deserialize)]
pub struct LabelParams {
    /// Restrict to one metric's labels.
    pub metric: Option<String>,
}

/// Response for label listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelResponse {
    /// Sorted, de-duplicated label names.
    pub labels: Vec<String>,
}

/// Creates the catalog routes.
pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/metrics", get(list_metrics).post(register_metrics))
        .route("/api/metrics/{key}", get(get_metric))
        .route("/api/labels", get(list_labels))
        .with_state(state)
}

async fn register_metrics(
    State(state): State<AppState>,
    payload: Result<Json<MetricRegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MetricRegisterResponse>)> {
    let metrics = match json_body(payload)? {
        MetricRegisterRequest::Single(metric) => vec![metric],
        MetricRegisterRequest::Batch(metrics) => metrics,
    };

    if metrics.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "empty_batch",
            "At least one metric is required",
        ));
    }

    let count = metrics.len();
    state.catalog().upsert_batch(metrics).map_err(store_error)?;
    tracing::debug!(count, "Registered catalog metrics");

    Ok((
        StatusCode::CREATED,
        Json(MetricRegisterResponse {
            accepted: count,
            message: format!("Registered {count} metric(s)"),
        }),
    ))
}

async fn list_metrics(
    State(state): State<AppState>,
    Query(params): Query<MetricListParams>,
) -> ApiResult<Json<MetricListResponse>> {
    let mut query = CatalogQuery::new();
    if let Some(kind) = params.kind.as_deref() {
        let kind: MetricKind = kind
            .parse()
            .map_err(|e: shared::models::MetricValidationError| {
                api_error(StatusCode::BAD_REQUEST, "invalid_kind", e.to_string())
            })?;
        query = query.with_kind(kind);
    }
    if let Some(search) = params.search {
        query = query.with_search(search);
    }

    let metrics = state.catalog().list(&query).map_err(store_error)?;
    Ok(Json(MetricListResponse {
        total_count: metrics.len(),
        metrics,
    }))
}

async fn get_metric(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Metric>> {
    state.catalog().get(&key).map(Json).map_err(store_error)
}

async fn list_labels(
    State(state): State<AppState>,
    Query(params): Query<LabelParams>,
) -> ApiResult<Json<LabelResponse>> {
    let labels = state
        .catalog()
        .labels(params.metric.as_deref())
        .map_err(store_error)?;
    Ok(Json(LabelResponse { labels }))
}
