//! Combined timeline of events and flow runs.

use super::error::{store_error, window_error, ApiResult};
use super::window::resolve_window;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Event, Flow, RelativeRange};
use shared::storage::{EventQuery, FlowQuery};
use uuid::Uuid;

/// One entry on the timeline.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineItem {
    /// An annotation.
    Event(Event),
    /// A flow run, placed at its start time.
    Flow(Flow),
}

impl TimelineItem {
    fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Event(e) => e.timestamp,
            Self::Flow(f) => f.start_time,
        }
    }
}

/// Query parameters for the timeline.
#[derive(Debug, Deserialize)]
pub struct TimelineParams {
    /// Relative window preset (default 24h).
    pub window: Option<String>,
    /// Absolute window start.
    pub start: Option<DateTime<Utc>>,
    /// Absolute window end.
    pub end: Option<DateTime<Utc>>,
    /// Tenant filter.
    pub tenant_id: Option<Uuid>,
}

/// Timeline response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    /// Items in the window, newest first.
    pub items: Vec<TimelineItem>,
    /// Resolved window start.
    pub start: DateTime<Utc>,
    /// Resolved window end.
    pub end: DateTime<Utc>,
}

/// Creates the timeline routes.
pub fn timeline_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/timeline", get(timeline))
        .with_state(state)
}

async fn timeline(
    State(state): State<AppState>,
    Query(params): Query<TimelineParams>,
) -> ApiResult<Json<TimelineResponse>> {
    let window = resolve_window(
        params.window.as_deref(),
        params.start,
        params.end,
        RelativeRange::Hours24,
        Utc::now(),
    )
    .map_err(window_error)?;

    let mut event_query = EventQuery::new().between(window.start, window.end);
    let mut flow_query = FlowQuery::new()
        .with_start_time(window.start)
        .with_end_time(window.end);
    if let Some(tenant_id) = params.tenant_id {
        event_query = event_query.with_tenant(tenant_id);
        flow_query = flow_query.with_tenant(tenant_id);
    }

    let events = state.event_store().query(&event_query).map_err(store_error)?;
    let flows = state.flow_store().query(&flow_query).map_err(store_error)?;

    let mut items: Vec<TimelineItem> = events
        .into_iter()
        .map(TimelineItem::Event)
        .chain(flows.flows.into_iter().map(TimelineItem::Flow))
        .collect();
    items.sort_by_key(|item| std::cmp::Reverse(item.at()));

    Ok(Json(TimelineResponse {
        items,
        start: window.start,
        end: window.end,
    }))
}
