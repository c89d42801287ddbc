use axum::extract::{rejection::QueryRejection, Path, Query, State};
use serde::Deserialize;

use crate::database::models::Shop;
use crate::database::ShopFilter;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::required;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    #[serde(rename = "type")]
    pub shop_type: Option<String>,
    pub mobile: Option<String>,
}

impl From<ShopQuery> for ShopFilter {
    fn from(query: ShopQuery) -> Self {
        Self {
            shop_type: required(query.shop_type.as_deref()).map(str::to_string),
            mobile: required(query.mobile.as_deref()).map(str::to_string),
        }
    }
}

/// GET /api/shops?type=&mobile= - newest first; blank filters are ignored
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Vec<Shop>> {
    let Query(query) = query?;
    let shops = state.shops().list(&query.into()).await?;
    Ok(ApiResponse::success(shops))
}

/// GET /api/shops/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Shop> {
    let shop = state.shops().get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(shop))
}

/// DELETE /api/shops/:id - returns the deleted shop; its images are removed best-effort
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Shop> {
    let shop = state.shops().delete(parse_id(&id)?).await?;
    Ok(ApiResponse::success(shop))
}
