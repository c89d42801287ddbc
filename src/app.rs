use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::{SecurityConfig, StorageBackend};
use crate::handlers::{auth, orders, shops, system};
use crate::pwa;
use crate::state::AppState;
use crate::storage::UPLOADS_ROUTE;

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    // Anything that is not an API route is the storefront shell
    let static_dir = &config.server.static_dir;
    let storefront = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let mut router = Router::new()
        .route("/health", get(system::health))
        .route("/sw.js", get(pwa::service_worker))
        .nest("/api", api_routes());

    if config.storage.backend == StorageBackend::Local {
        router = router.nest_service(UPLOADS_ROUTE, ServeDir::new(&config.storage.local_dir));
    }

    router
        .fallback_service(storefront)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(system::info))
        .merge(account_routes())
        .merge(shop_routes())
        .merge(order_routes())
        .fallback(system::api_not_found)
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(auth::user::signup))
        .route("/user/login", post(auth::user::login))
        .route("/owner/signup", post(auth::owner::signup))
        .route("/owner/login", post(auth::owner::login))
}

fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(shops::list).post(shops::upload))
        .route("/shops/:id", get(shops::get).delete(shops::delete))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::place))
        .route("/orders/pending", get(orders::pending))
        .route("/orders/user/:userId", get(orders::by_user))
        .route("/orders/status/:status", get(orders::by_status))
        .route("/orders/:id", get(orders::get))
        .route("/orders/:id/status", patch(orders::update_status))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        // No allowed origins: browsers keep the same-origin policy
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
