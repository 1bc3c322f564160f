//! Error responses shared by all handlers.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::models::TimeWindowError;
use shared::promql::PromQlError;
use shared::storage::StoreError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// Handler result type.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Builds an error response.
pub fn api_error(
    status: StatusCode,
    error: &str,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

/// Maps a store error to a response.
pub fn store_error(err: StoreError) -> (StatusCode, Json<ApiError>) {
    match err {
        StoreError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        StoreError::AlreadyExists { .. } => {
            api_error(StatusCode::CONFLICT, "already_exists", err.to_string())
        }
        StoreError::Validation(_) => {
            api_error(StatusCode::BAD_REQUEST, "validation_failed", err.to_string())
        }
        StoreError::LockError(_) => {
            tracing::error!(error = %err, "Store unavailable");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                err.to_string(),
            )
        }
    }
}

/// Maps a query generation error to a response.
pub fn promql_error(err: PromQlError) -> (StatusCode, Json<ApiError>) {
    let code = match &err {
        PromQlError::InvalidAggregation { .. } => "invalid_aggregation",
        PromQlError::EmptyWindow | PromQlError::TimeWindow(_) => "invalid_window",
        PromQlError::InvalidLabel(_) => "invalid_label",
        PromQlError::NoMetricSelected => "no_metric_selected",
        PromQlError::MetricMismatch { .. } => "metric_mismatch",
        PromQlError::Metric(_) => "invalid_metric",
    };
    api_error(StatusCode::BAD_REQUEST, code, err.to_string())
}

/// Maps a window resolution error to a response.
pub fn window_error(err: TimeWindowError) -> (StatusCode, Json<ApiError>) {
    api_error(StatusCode::BAD_REQUEST, "invalid_window", err.to_string())
}

/// Unwraps a JSON body, turning rejections into a 400.
///
/// A body cut off by the size limit keeps its 413.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            api_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                rejection.body_text(),
            )
        } else {
            api_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
        }
    })
}
