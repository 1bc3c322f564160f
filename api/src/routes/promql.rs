//! PromQL generation endpoint.
//!
//! Looks the selected metric up in the catalog, runs the aggregation through
//! the validity gate, and returns the generated expression together with the
//! resolved window.

use super::error::{api_error, json_body, promql_error, store_error, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use shared::models::BlockConfig;
use shared::promql::{build_block_query, GeneratedQuery};

/// Creates the PromQL routes.
pub fn promql_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/promql", post(generate))
        .with_state(state)
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<BlockConfig>, JsonRejection>,
) -> ApiResult<Json<GeneratedQuery>> {
    let config = json_body(payload)?;
    let Some(key) = config.metric_key.as_deref() else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "no_metric_selected",
            "metric_key is required",
        ));
    };

    let metric = state.catalog().get(key).map_err(store_error)?;
    let generated = build_block_query(&config, &metric, Utc::now()).map_err(promql_error)?;

    if generated.aggregation_corrected {
        tracing::debug!(
            metric = %metric.key,
            requested = ?config.aggregation,
            used = %generated.aggregation,
            "Aggregation replaced by kind default"
        );
    }
    Ok(Json(generated))
}
