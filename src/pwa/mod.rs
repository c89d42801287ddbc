//! Service worker generation.
//!
//! The worker precaches a fixed asset list into a named cache at install,
//! deletes every other cache on activate and answers GET requests cache-first,
//! falling back to the network. Renaming the cache is the only invalidation.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde_json::json;

use crate::state::AppState;

const TEMPLATE: &str = r#"// Generated by storefront-api. Bump the cache name to invalidate clients.
const CACHE_NAME = __CACHE_NAME__;
const ASSETS = __ASSETS__;

self.addEventListener('install', (event) => {
  event.waitUntil(
    caches.open(CACHE_NAME).then((cache) => cache.addAll(ASSETS))
  );
});

self.addEventListener('activate', (event) => {
  event.waitUntil(
    caches.keys().then((names) =>
      Promise.all(
        names
          .filter((name) => name !== CACHE_NAME)
          .map((name) => caches.delete(name))
      )
    )
  );
});

self.addEventListener('fetch', (event) => {
  if (event.request.method !== 'GET') {
    return;
  }
  event.respondWith(
    caches.match(event.request).then((cached) => cached || fetch(event.request))
  );
});
"#;

/// Render the worker script. Values are embedded as JSON literals so any
/// quote or newline in configuration stays inside its string.
pub fn render_service_worker(cache_name: &str, assets: &[String]) -> String {
    TEMPLATE
        .replace("__CACHE_NAME__", &json!(cache_name).to_string())
        .replace("__ASSETS__", &json!(assets).to_string())
}

/// GET /sw.js
pub async fn service_worker(State(state): State<AppState>) -> impl IntoResponse {
    let script = render_service_worker(&state.config.cache_name(), &state.config.pwa.assets);
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        script,
    )
}
