use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::accounts::{LoginRequest, SignupRequest};
use crate::state::AppState;

/// POST /api/user/signup - register a shopper
///
/// Body: `{ "name": "...", "phone": "...", "password": "..." }`.
/// 400 when a field is missing or the phone is already registered.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    let user = state.accounts().signup_user(request).await?;
    Ok(ApiResponse::created(user))
}

/// POST /api/user/login - 404 for an unknown phone, 401 for a wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;
    let user = state.accounts().login_user(request).await?;
    Ok(ApiResponse::success(user))
}
