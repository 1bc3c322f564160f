//! Notebook endpoints.
//!
//! Notebooks are created whole and then edited with partial updates
//! (`PATCH`), which is what the debounced client saver sends. Deleting a
//! notebook removes its comments too.

use super::error::{api_error, json_body, promql_error, store_error, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::models::{Block, Notebook, NotebookPatch};
use shared::promql::{build_block_query, GeneratedQuery};
use uuid::Uuid;

/// Request body for creating a notebook.
#[derive(Debug, Deserialize)]
pub struct CreateNotebookRequest {
    /// Notebook title.
    pub title: String,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    /// Initial blocks.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Query parameters for listing notebooks.
#[derive(Debug, Deserialize)]
pub struct NotebookListParams {
    /// Only notebooks of this tenant.
    pub tenant_id: Option<Uuid>,
}

/// Response for notebook listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct NotebookListResponse {
    /// Notebooks, most recently updated first.
    pub notebooks: Vec<Notebook>,
    /// Number of notebooks returned.
    pub total_count: usize,
}

/// Creates the notebook routes.
pub fn notebook_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/notebooks", get(list_notebooks).post(create_notebook))
        .route(
            "/api/notebooks/{id}",
            get(get_notebook)
                .patch(update_notebook)
                .delete(delete_notebook),
        )
        .route(
            "/api/notebooks/{id}/blocks/{block_id}/query",
            get(block_query),
        )
        .with_state(state)
}

async fn create_notebook(
    State(state): State<AppState>,
    payload: Result<Json<CreateNotebookRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Notebook>)> {
    let request = json_body(payload)?;
    let mut notebook = Notebook::new(request.title);
    notebook.tenant_id = request.tenant_id;
    notebook.blocks = request.blocks;

    let notebook = state.notebook_store().create(notebook).map_err(store_error)?;
    tracing::info!(notebook_id = %notebook.id, "Created notebook");
    Ok((StatusCode::CREATED, Json(notebook)))
}

async fn list_notebooks(
    State(state): State<AppState>,
    Query(params): Query<NotebookListParams>,
) -> ApiResult<Json<NotebookListResponse>> {
    let notebooks = state
        .notebook_store()
        .list(params.tenant_id)
        .map_err(store_error)?;
    Ok(Json(NotebookListResponse {
        total_count: notebooks.len(),
        notebooks,
    }))
}

async fn get_notebook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notebook>> {
    state.notebook_store().get(id).map(Json).map_err(store_error)
}

async fn update_notebook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<NotebookPatch>, JsonRejection>,
) -> ApiResult<Json<Notebook>> {
    let patch = json_body(payload)?;
    if patch.is_empty() {
        return state.notebook_store().get(id).map(Json).map_err(store_error);
    }

    let notebook = state
        .notebook_store()
        .update(id, patch)
        .map_err(store_error)?;
    tracing::debug!(notebook_id = %id, blocks = notebook.blocks.len(), "Updated notebook");
    Ok(Json(notebook))
}

async fn delete_notebook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.notebook_store().delete(id).map_err(store_error)?;
    let comments = state
        .comment_store()
        .delete_for_notebook(id)
        .map_err(store_error)?;
    tracing::info!(notebook_id = %id, comments, "Deleted notebook");
    Ok(StatusCode::NO_CONTENT)
}

/// Generates the query for a chart or number block from its stored config.
async fn block_query(
    State(state): State<AppState>,
    Path((id, block_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<GeneratedQuery>> {
    let notebook = state.notebook_store().get(id).map_err(store_error)?;
    let block = notebook
        .block(block_id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "not_found", format!("block not found: {block_id}")))?;

    let config = block
        .config()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "invalid_block_config", e.to_string()))?
        .unwrap_or_default();
    let Some(key) = config.metric_key.as_deref() else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "no_metric_selected",
            "Block has no metric selected",
        ));
    };

    let metric = state.catalog().get(key).map_err(store_error)?;
    build_block_query(&config, &metric, Utc::now())
        .map(Json)
        .map_err(promql_error)
}
