//! Tenant endpoints.

use super::error::{json_body, store_error, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::Tenant;

/// Request body for creating a tenant.
#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    /// Tenant name, unique ignoring case.
    pub name: String,
}

/// Response for tenant listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct TenantListResponse {
    /// Tenants ordered by name.
    pub tenants: Vec<Tenant>,
}

/// Creates the tenant routes.
pub fn tenant_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/tenants", get(list_tenants).post(create_tenant))
        .with_state(state)
}

async fn create_tenant(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tenant>)> {
    let request = json_body(payload)?;
    let tenant = Tenant::new(request.name.trim());
    state
        .tenant_store()
        .insert(tenant.clone())
        .map_err(store_error)?;
    tracing::info!(tenant_id = %tenant.id, name = %tenant.name, "Created tenant");
    Ok((StatusCode::CREATED, Json(tenant)))
}

async fn list_tenants(State(state): State<AppState>) -> ApiResult<Json<TenantListResponse>> {
    let tenants = state.tenant_store().list().map_err(store_error)?;
    Ok(Json(TenantListResponse { tenants }))
}
