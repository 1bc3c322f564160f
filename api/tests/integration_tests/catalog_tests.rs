//! Integration tests for the metric catalog and label endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, post_json, seeded_app, test_app};

#[tokio::test]
async fn test_register_single_metric_and_fetch() {
    let (app, _state) = test_app();

    let (status, response) = post_json(
        app.clone(),
        "/api/metrics",
        json!({
            "key": "jobs_processed_total",
            "kind": "events",
            "description": "Jobs finished by workers",
            "labels": ["queue", "outcome"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["accepted"], 1);

    let (status, metric) = get(app, "/api/metrics/jobs_processed_total").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metric["kind"], "events");
    assert_eq!(metric["display_as"], "jobs_processed_total");
    assert_eq!(metric["labels"], json!(["queue", "outcome"]));
}

#[tokio::test]
async fn test_register_rejects_unknown_kind() {
    let (app, state) = test_app();

    let (status, response) = post_json(
        app,
        "/api/metrics",
        json!({"key": "cpu", "kind": "gauge"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_json");
    assert_eq!(state.catalog().count().unwrap(), 0);
}

#[tokio::test]
async fn test_register_rejects_invalid_metric_name() {
    let (app, state) = test_app();

    for key in ["my-metric", "up) or vector(1"] {
        let (status, response) = post_json(
            app.clone(),
            "/api/metrics",
            json!({"key": key, "kind": "values"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "validation_failed");
    }
    assert_eq!(state.catalog().count().unwrap(), 0);
}

#[tokio::test]
async fn test_register_batch_is_all_or_nothing() {
    let (app, state) = test_app();

    let (status, response) = post_json(
        app,
        "/api/metrics",
        json!([
            {"key": "good_metric", "kind": "values"},
            {"key": "", "kind": "values"}
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "validation_failed");
    assert_eq!(state.catalog().count().unwrap(), 0);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let (app, _state) = test_app();
    let (status, response) = post_json(app, "/api/metrics", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "empty_batch");
}

#[tokio::test]
async fn test_search_matches_display_name() {
    let (app, _state) = seeded_app();

    let (status, response) = get(app, "/api/metrics?search=http%20req").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["total_count"], 1);
    assert_eq!(response["metrics"][0]["key"], "http_requests_total");
}

#[tokio::test]
async fn test_list_is_ordered_by_key() {
    let (app, _state) = seeded_app();

    let (_, response) = get(app, "/api/metrics").await;
    let keys: Vec<&str> = response["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["key"].as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        ["http_requests_total", "queue_depth", "request_duration_seconds"]
    );
}

#[tokio::test]
async fn test_labels_union_and_per_metric() {
    let (app, _state) = seeded_app();

    let (status, response) = get(app.clone(), "/api/labels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["labels"], json!(["queue", "route", "status"]));

    let (status, response) = get(app.clone(), "/api/labels?metric=http_requests_total").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["labels"], json!(["route", "status"]));

    let (status, _) = get(app, "/api/labels?metric=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_metric_is_404() {
    let (app, _state) = seeded_app();
    let (status, response) = get(app, "/api/metrics/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}
