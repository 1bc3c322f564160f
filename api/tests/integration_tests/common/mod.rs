//! Common test utilities and helpers for integration tests.
//!
//! Provides app setup with a seeded metric catalog and small HTTP helpers
//! that return the status code and parsed JSON body.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::{Metric, MetricKind};

/// Creates a test router with fresh in-memory stores.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_in_memory_store();
    let router = create_router(state.clone());
    (router, state)
}

/// Creates a test router whose catalog holds one metric of each kind.
///
/// - `http_requests_total` (events; labels `status`, `route`)
/// - `queue_depth` (values; label `queue`)
/// - `request_duration_seconds` (distribution; label `route`)
pub fn seeded_app() -> (Router, AppState) {
    let (router, state) = test_app();
    state
        .catalog()
        .upsert_batch(vec![
            Metric::new("http_requests_total", MetricKind::Events)
                .with_display_as("HTTP requests")
                .with_label("status")
                .with_label("route"),
            Metric::new("queue_depth", MetricKind::Values).with_label("queue"),
            Metric::new("request_duration_seconds", MetricKind::Distribution)
                .with_label("route")
                .with_unit("s"),
        ])
        .unwrap();
    (router, state)
}

/// Sends a request and returns the status and parsed JSON body
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(serde_json::to_string(&b).unwrap())))
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// Helper to make a POST request with JSON body.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Helper to make a PATCH request with JSON body.
pub async fn patch_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "PATCH", uri, Some(body)).await
}

/// Helper to make a DELETE request.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, "DELETE", uri, None).await
}
