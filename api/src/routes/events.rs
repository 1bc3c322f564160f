//! Timeline event endpoints.

use super::error::{json_body, store_error, window_error, ApiResult};
use super::window::resolve_window;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Event, RelativeRange};
use shared::storage::EventQuery;
use std::collections::HashMap;
use uuid::Uuid;

/// An event as posted by a client.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// When it happened (defaults to now).
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    /// Labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl From<EventRequest> for Event {
    fn from(req: EventRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: req.tenant_id,
            title: req.title,
            description: req.description,
            timestamp: req.timestamp,
            labels: req.labels,
        }
    }
}

/// Query parameters for listing events.
#[derive(Debug, Deserialize)]
pub struct EventListParams {
    /// Relative window preset (default 24h).
    pub window: Option<String>,
    /// Absolute window start; used with `end`.
    pub start: Option<DateTime<Utc>>,
    /// Absolute window end; used with `start`.
    pub end: Option<DateTime<Utc>>,
    /// Tenant filter.
    pub tenant_id: Option<Uuid>,
    /// Maximum number of events.
    pub limit: Option<usize>,
}

/// Response for event listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventListResponse {
    /// Events in the window, newest first.
    pub events: Vec<Event>,
    /// Resolved window start.
    pub start: DateTime<Utc>,
    /// Resolved window end.
    pub end: DateTime<Utc>,
}

/// Creates the event routes.
pub fn event_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .with_state(state)
}

async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event: Event = json_body(payload)?.into();
    state
        .event_store()
        .insert(event.clone())
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> ApiResult<Json<EventListResponse>> {
    let window = resolve_window(
        params.window.as_deref(),
        params.start,
        params.end,
        RelativeRange::Hours24,
        Utc::now(),
    )
    .map_err(window_error)?;

    let mut query = EventQuery::new().between(window.start, window.end);
    if let Some(tenant_id) = params.tenant_id {
        query = query.with_tenant(tenant_id);
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }

    let events = state.event_store().query(&query).map_err(store_error)?;
    Ok(Json(EventListResponse {
        events,
        start: window.start,
        end: window.end,
    }))
}
