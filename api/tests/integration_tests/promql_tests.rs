//! Integration tests for PromQL generation through the API.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use super::common::{post_json, seeded_app};

fn absolute_window(secs: i64) -> serde_json::Value {
    let end = Utc::now();
    let start = end - Duration::seconds(secs);
    json!({"type": "absolute", "start": start, "end": end})
}

#[tokio::test]
async fn test_events_sum_with_status_filter() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({
            "metric_key": "http_requests_total",
            "aggregation": "sum",
            "filters": [{"label": "status", "operator": "equals", "value": "200"}],
            "time_window": {"type": "relative", "value": "15m"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["query"],
        r#"sum(increase(http_requests_total{status="200"}[60s]))"#
    );
    assert_eq!(response["rate_window_secs"], 60);
}

#[tokio::test]
async fn test_rate_per_minute_grouped() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({
            "metric_key": "http_requests_total",
            "aggregation": "rate_per_minute",
            "group_by": ["route"],
            "filters": [{"label": "route", "operator": "contains", "value": "/api"}],
            "time_window": {"type": "relative", "value": "7d"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["query"],
        r#"sum by (route) (rate(http_requests_total{route=~".*/api.*"}[3600s])) * 60"#
    );
}

#[tokio::test]
async fn test_values_agg_over_time_uses_full_interval() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({
            "metric_key": "queue_depth",
            "aggregation": "avg",
            "agg_over_time": true,
            "time_window": absolute_window(3600)
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["query"], "avg_over_time(queue_depth[3600s])");
}

#[tokio::test]
async fn test_distribution_defaults_to_p95() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({"metric_key": "request_duration_seconds"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["aggregation"], "p95");
    assert_eq!(response["aggregation_corrected"], false);
    assert_eq!(
        response["query"],
        "histogram_quantile(0.95, sum(rate(request_duration_seconds[300s])))"
    );
}

#[tokio::test]
async fn test_percentile_on_values_metric_resets_to_avg() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({"metric_key": "queue_depth", "aggregation": "p95"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["aggregation"], "avg");
    assert_eq!(response["query"], "avg(queue_depth)");
}

#[tokio::test]
async fn test_escapes_filter_values() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({
            "metric_key": "queue_depth",
            "aggregation": "max",
            "filters": [{"label": "queue", "operator": "not_equals", "value": "a\"b\\c"}]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["query"], r#"max(queue_depth{queue!="a\"b\\c"})"#);
}

#[tokio::test]
async fn test_invalid_group_by_label_rejected() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({"metric_key": "queue_depth", "group_by": ["bad-label"]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_label");
}

#[tokio::test]
async fn test_empty_absolute_window_rejected() {
    let (app, _state) = seeded_app();
    let now = Utc::now();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({
            "metric_key": "queue_depth",
            "time_window": {"type": "absolute", "start": now, "end": now}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_window");
}

#[tokio::test]
async fn test_unsupported_preset_rejected_as_json_error() {
    let (app, _state) = seeded_app();

    let (status, response) = post_json(
        app,
        "/api/promql",
        json!({
            "metric_key": "queue_depth",
            "time_window": {"type": "relative", "value": "2h"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_json");
}
