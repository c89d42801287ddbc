use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api - what this server is and where things live
pub async fn info(State(state): State<AppState>) -> ApiResult<Value> {
    let flavor = state.config.server.flavor;

    Ok(ApiResponse::success(json!({
        "name": flavor.display_name(),
        "flavor": flavor.slug(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "user": "POST /api/user/signup, POST /api/user/login",
            "owner": "POST /api/owner/signup, POST /api/owner/login",
            "shops": "GET|POST /api/shops, GET|DELETE /api/shops/:id",
            "orders": "POST /api/orders, GET /api/orders/:id, PATCH /api/orders/:id/status",
            "order_queries": "GET /api/orders/user/:userId, /api/orders/pending, /api/orders/status/:status",
            "health": "GET /health",
            "service_worker": "GET /sw.js",
        }
    })))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let flavor = state.config.server.flavor.slug();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "flavor": flavor,
                    "timestamp": now,
                    "database": "ok",
                    "storage": state.store.name(),
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "flavor": flavor,
                        "timestamp": now,
                        "database": "unavailable",
                        "storage": state.store.name(),
                    }
                })),
            )
        }
    }
}

/// Fallback for /api/*: JSON 404 instead of the storefront shell
pub async fn api_not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("No route for {} {}", method, uri.path()))
}
