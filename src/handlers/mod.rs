// handlers/mod.rs - HTTP handlers grouped by resource
//
// Every handler returns `ApiResult<T>`, so successes share the
// `{ success, data }` envelope and failures go through `ApiError`.
//
// ├── auth/    POST /api/user/*, /api/owner/*  (signup, login)
// ├── shops/   /api/shops                      (upload, list, get, delete)
// ├── orders/  /api/orders                     (place, query, status)
// └── system   /health, /api, JSON 404 under /api
pub mod auth;
pub mod orders;
pub mod shops;
pub mod system;

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids are parsed by hand so malformed ones get the JSON error envelope
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Ok(Uuid::parse_str(raw.trim())?)
}
