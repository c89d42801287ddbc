use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::Owner;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::accounts::{LoginRequest, SignupRequest};
use crate::state::AppState;

/// POST /api/owner/signup - register a shop owner by phone and password
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Owner> {
    let Json(request) = payload?;
    let owner = state.accounts().signup_owner(request).await?;
    Ok(ApiResponse::created(owner))
}

/// POST /api/owner/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Owner> {
    let Json(request) = payload?;
    let owner = state.accounts().login_owner(request).await?;
    Ok(ApiResponse::success(owner))
}
