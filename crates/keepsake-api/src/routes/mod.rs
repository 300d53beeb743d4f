//! API routes

mod admin;
mod albums;
mod analytics;
mod categories;
mod files;
mod health;
pub mod metrics;
mod notes;
mod types;
mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use rust_embed::Embed;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Embedded static files from the frontend build
#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/../../static"]
struct Assets;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// Handler for serving embedded static files
async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Admin pages must never be cached so clients pick up fresh builds
    let cache_control = if path.starts_with("admin") {
        NO_STORE
    } else {
        "public, max-age=300"
    };

    if let Some(content) = <Assets as Embed>::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        (
            [
                (header::CONTENT_TYPE, mime.as_ref()),
                (header::CACHE_CONTROL, cache_control),
            ],
            content.data.into_owned(),
        )
            .into_response()
    } else if let Some(content) = <Assets as Embed>::get("index.html") {
        // SPA fallback: serve index.html for any unmatched route
        (
            [(header::CACHE_CONTROL, cache_control)],
            Html(content.data.into_owned()),
        )
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Public API
        .merge(albums::routes())
        .merge(notes::routes())
        .merge(analytics::routes())
        .merge(categories::routes())
        // Uploads
        .merge(upload::routes())
        .merge(files::routes())
        // Admin API
        .merge(admin::routes())
        .with_state(state)
        // Allow large multipart album uploads (100MB max)
        .layer(DefaultBodyLimit::max(100 * 1024 * 1024));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    // Serve embedded static files (SPA) - must be last to not interfere with API routes
    router.fallback(serve_embedded_file)
}
