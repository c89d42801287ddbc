use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::Order;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::orders::PlaceOrderRequest;
use crate::state::AppState;

/**
 * POST /api/orders - place an order
 *
 * Expected Input:
 * ```json
 * {
 *   "userId": "uuid (optional, omit for guest checkout)",
 *   "user": { "name": "Meera", "phone": "9000000003" },
 *   "shop": "Chat Point Cafe",
 *   "cart": { "Chat Point Cafe": { "Pani Puri": { "price": 40, "quantity": 2 } } },
 *   "deliveryCharge": 20,
 *   "address": { "line1": "4 Lake View", "location": "Lat: 12.9, Lng: 77.6" },
 *   "paymentMethod": "cod"
 * }
 * ```
 *
 * The cart is flattened into line items and the total recomputed; a
 * `totalAmount` sent by the client is ignored. New orders are `pending`.
 */
pub async fn place(
    State(state): State<AppState>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let Json(request) = payload?;
    let order = state.orders().place(request).await?;
    Ok(ApiResponse::created(order))
}
