//! Axum REST handlers for the campaign builder API.

use crate::models::*;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use campaign_core::types::{Caller, CampaignRequest, CreationResult, PersistedCampaign};
use campaign_core::{CampaignError, StoreError};
use campaign_meta::CampaignFactory;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Header carrying the caller id asserted by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Outward message for every creation failure; the error code keeps the
/// distinction.
const CREATE_FAILED: &str = "Failed to create campaign";

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared handler state.
#[derive(Clone)]
pub struct ManagementState {
    pub factory: Arc<CampaignFactory>,
}

fn api_error(status: StatusCode, error: &str, message: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
}

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Caller::new)
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "missing_user",
                format!("{USER_ID_HEADER} header is required"),
            )
        })
}

/// Map a creation failure onto an HTTP status, keeping the taxonomy in the
/// error code.
pub fn creation_error(err: &CampaignError) -> ApiError {
    let status = match err {
        CampaignError::UnsupportedPromotionType(_) | CampaignError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        CampaignError::RemoteCall { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.code(), format!("{CREATE_FAILED}: {err}"))
}

fn store_error(err: StoreError) -> ApiError {
    error!(error = %err, "Campaign store read failed");
    api_error(StatusCode::SERVICE_UNAVAILABLE, "store_error", err.to_string())
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn create_campaign(
    State(state): State<ManagementState>,
    headers: HeaderMap,
    Json(request): Json<CampaignRequest>,
) -> Result<(StatusCode, Json<CreationResult>), ApiError> {
    let caller = caller_from_headers(&headers)?;

    match state.factory.create_campaign(&caller, &request).await {
        Ok(result) => Ok((StatusCode::CREATED, Json(result))),
        Err(e) => {
            metrics::counter!("api.campaigns.errors", "code" => e.code()).increment(1);
            Err(creation_error(&e))
        }
    }
}

pub async fn list_campaigns(
    State(state): State<ManagementState>,
    headers: HeaderMap,
) -> Result<Json<CampaignListResponse>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    let campaigns = state
        .factory
        .store()
        .list_for_user(&caller.user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(CampaignListResponse {
        total: campaigns.len(),
        campaigns,
    }))
}

pub async fn get_campaign(
    State(state): State<ManagementState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<PersistedCampaign>, ApiError> {
    let caller = caller_from_headers(&headers)?;
    state
        .factory
        .store()
        .get(id)
        .await
        .map_err(store_error)?
        .filter(|c| c.user_id == caller.user_id)
        .map(Json)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("campaign {id} not found"),
            )
        })
}

// ─── Operational ───────────────────────────────────────────────────────────

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
