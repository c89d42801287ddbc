use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::database::models::Order;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{orders::parse_status, orders::StatusUpdateRequest, required};
use crate::state::AppState;

/// PATCH /api/orders/:id/status - `{ "status": "delivered" | "cancelled" }`
///
/// Only pending orders move; anything else is a 409.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let raw = required(request.status.as_deref()).ok_or_else(|| ApiError::missing_fields(&["status"]))?;
    let status = parse_status(raw)?;

    let order = state.orders().update_status(id, status).await?;
    Ok(ApiResponse::success(order))
}
