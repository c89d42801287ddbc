use axum::extract::{Path, State};

use crate::database::models::Order;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::orders::parse_status;
use crate::state::AppState;
use crate::types::OrderStatus;

/// GET /api/orders/user/:userId - newest first
pub async fn by_user(State(state): State<AppState>, Path(user_id): Path<String>) -> ApiResult<Vec<Order>> {
    let orders = state.orders().for_user(parse_id(&user_id)?).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/orders/pending - the owner's work queue, oldest first
pub async fn pending(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    let orders = state.orders().with_status(OrderStatus::Pending).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/orders/status/:status
pub async fn by_status(State(state): State<AppState>, Path(status): Path<String>) -> ApiResult<Vec<Order>> {
    let status = parse_status(&status)?;
    let orders = state.orders().with_status(status).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/orders/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Order> {
    let order = state.orders().get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(order))
}
