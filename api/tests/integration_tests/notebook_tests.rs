//! Integration tests for notebooks, blocks, and comments.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use shared::models::{Aggregation, Block, BlockConfig, BlockKind, Filter};
use uuid::Uuid;

use super::common::{delete, get, patch_json, post_json, seeded_app, test_app};

#[tokio::test]
async fn test_notebook_lifecycle() {
    let (app, _state) = test_app();

    let (status, created) = post_json(
        app.clone(),
        "/api/notebooks",
        json!({"title": "Checkout latency"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let blocks = vec![Block::heading("Summary", 2), Block::paragraph("p99 doubled")];
    let (status, updated) = patch_json(
        app.clone(),
        &format!("/api/notebooks/{id}"),
        json!({"blocks": blocks}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Checkout latency");
    assert_eq!(updated["blocks"].as_array().unwrap().len(), 2);
    assert_eq!(updated["blocks"][0]["props"]["level"], 2);

    let (status, listed) = get(app.clone(), "/api/notebooks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total_count"], 1);

    let (status, _) = delete(app.clone(), &format!("/api/notebooks/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(app, &format!("/api/notebooks/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_patch_keeps_notebook() {
    let (app, _state) = test_app();

    let (_, created) = post_json(app.clone(), "/api/notebooks", json!({"title": "keep"})).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, response) =
        patch_json(app.clone(), &format!("/api/notebooks/{id}"), json!({"title": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "validation_failed");

    let (_, fetched) = get(app, &format!("/api/notebooks/{id}")).await;
    assert_eq!(fetched["title"], "keep");
}

#[tokio::test]
async fn test_chart_block_query() {
    let (app, _state) = seeded_app();

    let config = BlockConfig {
        metric_key: Some("http_requests_total".to_string()),
        filters: vec![Filter::equals("status", "500")],
        aggregation: Some(Aggregation::Rate),
        ..BlockConfig::default()
    };
    let chart = Block::metric(BlockKind::Chart, &config).unwrap();
    let chart_id = chart.id;

    let (status, created) = post_json(
        app.clone(),
        "/api/notebooks",
        json!({"title": "Errors", "blocks": [chart, Block::paragraph("note")]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    let paragraph_id = created["blocks"][1]["id"].as_str().unwrap().to_string();

    let (status, response) = get(
        app.clone(),
        &format!("/api/notebooks/{id}/blocks/{chart_id}/query"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["query"],
        r#"sum(rate(http_requests_total{status="500"}[300s]))"#
    );

    let (status, response) = get(
        app.clone(),
        &format!("/api/notebooks/{id}/blocks/{paragraph_id}/query"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_block_config");

    let (status, _) = get(
        app,
        &format!("/api/notebooks/{id}/blocks/{}/query", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_block_config_is_an_error() {
    let (app, _state) = seeded_app();

    let block = Block::new(BlockKind::Number).with_prop("config", json!("{not json"));
    let block_id = block.id;
    let (_, created) = post_json(
        app.clone(),
        "/api/notebooks",
        json!({"title": "Broken", "blocks": [block]}),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, response) = get(app, &format!("/api/notebooks/{id}/blocks/{block_id}/query")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_block_config");
}

#[tokio::test]
async fn test_comments_on_notebook() {
    let (app, _state) = test_app();

    let paragraph = Block::paragraph("deploy at 14:02");
    let block_id = paragraph.id;
    let (_, created) = post_json(
        app.clone(),
        "/api/notebooks",
        json!({"title": "Release", "blocks": [paragraph]}),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, comment) = post_json(
        app.clone(),
        "/api/comments",
        json!({"notebook_id": id, "block_id": block_id, "author": "sam", "body": "confirmed"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["block_id"], block_id.to_string());

    let (status, _) = post_json(
        app.clone(),
        "/api/comments",
        json!({"notebook_id": id, "block_id": Uuid::new_v4(), "author": "sam", "body": "?"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        app.clone(),
        "/api/comments",
        json!({"notebook_id": Uuid::new_v4(), "author": "sam", "body": "orphan"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = get(app.clone(), &format!("/api/comments?notebook_id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["comments"].as_array().unwrap().len(), 1);

    let (status, _) = get(app, "/api/comments").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// A notebook body just over the 2 MiB request limit.
fn oversized_notebook() -> String {
    let text = "x".repeat(2 * 1024 * 1024);
    json!({"title": "Too big", "blocks": [Block::paragraph(text)]}).to_string()
}

#[tokio::test]
async fn test_oversized_body_with_length_is_rejected() {
    let (app, state) = test_app();
    let body = oversized_notebook();

    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/notebooks")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(state.notebook_store().list(None).unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_streamed_body_is_rejected() {
    let (app, state) = test_app();

    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/notebooks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(oversized_notebook()))
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "payload_too_large");
    assert!(state.notebook_store().list(None).unwrap().is_empty());
}
