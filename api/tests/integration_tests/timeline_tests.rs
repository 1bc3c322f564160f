//! Integration tests for tenants, flows, events, and the timeline.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use super::common::{get, post_json, test_app};

async fn create_tenant(app: axum::Router, name: &str) -> String {
    let (status, tenant) = post_json(app, "/api/tenants", json!({"name": name})).await;
    assert_eq!(status, StatusCode::CREATED);
    tenant["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_tenants_unique_by_name() {
    let (app, _state) = test_app();

    create_tenant(app.clone(), "acme").await;
    let (status, response) = post_json(app.clone(), "/api/tenants", json!({"name": "ACME"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"], "already_exists");

    let (_, listed) = get(app, "/api/tenants").await;
    assert_eq!(listed["tenants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_flows_paginate_newest_first() {
    let (app, _state) = test_app();
    let tenant = create_tenant(app.clone(), "acme").await;

    for minutes_ago in [30, 10, 20] {
        let (status, _) = post_json(
            app.clone(),
            "/api/flows",
            json!({
                "tenant_id": tenant,
                "name": format!("export-{minutes_ago}"),
                "start_time": Utc::now() - Duration::minutes(minutes_ago)
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = get(
        app.clone(),
        &format!("/api/flows?tenant_id={tenant}&limit=2&offset=0"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 3);
    let names: Vec<&str> = page["flows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["export-10", "export-20"]);

    let (_, page) = get(app.clone(), "/api/flows?limit=2&offset=2").await;
    assert_eq!(page["flows"][0]["name"], "export-30");

    let (status, response) = get(app.clone(), "/api/flows?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_limit");

    let (status, page) = get(app.clone(), "/api/flows?limit=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 3);

    let (status, response) = get(app, "/api/flows?limit=501").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_limit");
}

#[tokio::test]
async fn test_flow_status_update_and_validation() {
    let (app, _state) = test_app();
    let tenant = create_tenant(app.clone(), "acme").await;

    let (_, flow) = post_json(
        app.clone(),
        "/api/flows",
        json!({"tenant_id": tenant, "name": "nightly"}),
    )
    .await;
    let id = flow["id"].as_str().unwrap().to_string();
    assert_eq!(flow["status"], "running");

    // A terminal status needs an end time.
    let (status, _) = post_json(
        app.clone(),
        "/api/flows",
        json!({"id": id, "tenant_id": tenant, "name": "nightly", "status": "failed",
               "start_time": flow["start_time"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        app.clone(),
        "/api/flows",
        json!({"id": id, "tenant_id": tenant, "name": "nightly", "status": "succeeded",
               "start_time": flow["start_time"], "end_time": Utc::now()}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fetched) = get(app.clone(), &format!("/api/flows/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "succeeded");

    let (_, succeeded) = get(app, "/api/flows?status=succeeded").await;
    assert_eq!(succeeded["total_count"], 1);
}

#[tokio::test]
async fn test_flow_for_unknown_tenant_is_404() {
    let (app, _state) = test_app();
    let (status, _) = post_json(
        app,
        "/api/flows",
        json!({"tenant_id": uuid::Uuid::new_v4(), "name": "orphan"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_window() {
    let (app, _state) = test_app();

    for (title, hours_ago) in [("recent deploy", 1), ("old deploy", 48)] {
        let (status, _) = post_json(
            app.clone(),
            "/api/events",
            json!({"title": title, "timestamp": Utc::now() - Duration::hours(hours_ago)}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, response) = get(app.clone(), "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["events"].as_array().unwrap().len(), 1);
    assert_eq!(response["events"][0]["title"], "recent deploy");

    let (_, response) = get(app.clone(), "/api/events?window=7d").await;
    assert_eq!(response["events"].as_array().unwrap().len(), 2);

    let (status, response) = get(app, "/api/events?window=5m").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_window");
}

#[tokio::test]
async fn test_timeline_merges_events_and_flows() {
    let (app, _state) = test_app();
    let tenant = create_tenant(app.clone(), "acme").await;

    post_json(
        app.clone(),
        "/api/events",
        json!({"title": "incident", "timestamp": Utc::now() - Duration::minutes(5)}),
    )
    .await;
    post_json(
        app.clone(),
        "/api/flows",
        json!({"tenant_id": tenant, "name": "backfill",
               "start_time": Utc::now() - Duration::minutes(30)}),
    )
    .await;

    let (status, response) = get(app, "/api/timeline?window=1h").await;
    assert_eq!(status, StatusCode::OK);

    let kinds: Vec<&str> = response["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item: &Value| item["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["event", "flow"]);
}
