//! Notebook comment endpoints.

use super::error::{api_error, json_body, store_error, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::Comment;
use uuid::Uuid;

/// Request body for posting a comment.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    /// Notebook being commented on.
    pub notebook_id: Uuid,
    /// Block the comment is anchored to.
    #[serde(default)]
    pub block_id: Option<Uuid>,
    /// Author name.
    pub author: String,
    /// Comment text.
    pub body: String,
}

/// Query parameters for listing comments.
#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    /// Notebook whose comments to list.
    pub notebook_id: Option<Uuid>,
}

/// Response for comment listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
}

/// Creates the comment routes.
pub fn comment_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/comments", get(list_comments).post(create_comment))
        .with_state(state)
}

async fn create_comment(
    State(state): State<AppState>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let request = json_body(payload)?;

    let notebook = state
        .notebook_store()
        .get(request.notebook_id)
        .map_err(store_error)?;
    let mut comment = Comment::new(notebook.id, request.author, request.body);
    if let Some(block_id) = request.block_id {
        if notebook.block(block_id).is_none() {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("block not found: {block_id}"),
            ));
        }
        comment = comment.on_block(block_id);
    }

    state
        .comment_store()
        .insert(comment.clone())
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<CommentListParams>,
) -> ApiResult<Json<CommentListResponse>> {
    let Some(notebook_id) = params.notebook_id else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "missing_parameter",
            "notebook_id is required",
        ));
    };
    let comments = state
        .comment_store()
        .list_for_notebook(notebook_id)
        .map_err(store_error)?;
    Ok(Json(CommentListResponse { comments }))
}
