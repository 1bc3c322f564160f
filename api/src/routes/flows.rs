//! Flow execution endpoints.

use super::error::{api_error, json_body, store_error, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Flow, FlowStatus};
use shared::storage::FlowQuery;
use std::collections::HashMap;
use uuid::Uuid;

/// Default page size for flow listings.
const DEFAULT_LIMIT: usize = 50;

/// Upper bound on the page size.
const MAX_LIMIT: usize = 500;

/// A flow as reported by a runner. Posting an existing id replaces it.
#[derive(Debug, Deserialize)]
pub struct FlowRequest {
    /// Existing flow id, when reporting a status change.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Flow name.
    pub name: String,
    /// Current status.
    #[serde(default)]
    pub status: FlowStatus,
    /// Start time (defaults to now).
    #[serde(default = "Utc::now")]
    pub start_time: DateTime<Utc>,
    /// End time, required for terminal statuses.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl From<FlowRequest> for Flow {
    fn from(req: FlowRequest) -> Self {
        Self {
            id: req.id.unwrap_or_else(Uuid::new_v4),
            tenant_id: req.tenant_id,
            name: req.name,
            status: req.status,
            start_time: req.start_time,
            end_time: req.end_time,
            labels: req.labels,
        }
    }
}

/// Query parameters for listing flows.
#[derive(Debug, Deserialize)]
pub struct FlowListParams {
    /// Tenant filter.
    pub tenant_id: Option<Uuid>,
    /// Status filter.
    pub status: Option<FlowStatus>,
    /// Name substring filter.
    pub name: Option<String>,
    /// Page size.
    pub limit: Option<usize>,
    /// Page offset.
    pub offset: Option<usize>,
}

/// Response for flow listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlowListResponse {
    /// Flows on this page, newest first.
    pub flows: Vec<Flow>,
    /// Number of flows matching the filters.
    pub total_count: usize,
    /// Page size used.
    pub limit: usize,
    /// Offset used.
    pub offset: usize,
}

/// Creates the flow routes.
pub fn flow_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/flows", get(list_flows).post(report_flow))
        .route("/api/flows/{id}", get(get_flow))
        .with_state(state)
}

async fn report_flow(
    State(state): State<AppState>,
    payload: Result<Json<FlowRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Flow>)> {
    let flow: Flow = json_body(payload)?.into();

    state.tenant_store().get(flow.tenant_id).map_err(store_error)?;
    state.flow_store().upsert(flow.clone()).map_err(store_error)?;
    tracing::debug!(flow_id = %flow.id, status = %flow.status, "Recorded flow");
    Ok((StatusCode::CREATED, Json(flow)))
}

async fn list_flows(
    State(state): State<AppState>,
    Query(params): Query<FlowListParams>,
) -> ApiResult<Json<FlowListResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "invalid_limit",
            format!("limit must be between 1 and {MAX_LIMIT}"),
        ));
    }
    let offset = params.offset.unwrap_or(0);

    let mut query = FlowQuery::new().with_limit(limit).with_offset(offset);
    if let Some(tenant_id) = params.tenant_id {
        query = query.with_tenant(tenant_id);
    }
    if let Some(status) = params.status {
        query = query.with_status(status);
    }
    if let Some(name) = params.name {
        query = query.with_name_contains(name);
    }

    let result = state.flow_store().query(&query).map_err(store_error)?;
    Ok(Json(FlowListResponse {
        flows: result.flows,
        total_count: result.total_count,
        limit,
        offset,
    }))
}

async fn get_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Flow>> {
    state.flow_store().get(id).map(Json).map_err(store_error)
}
