//! Stored upload serving

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use keepsake_storage::StorageError;

use crate::state::AppState;

/// GET /uploads/{*path} - serve a stored upload from disk.
///
/// Served with no-store so fresh uploads are visible immediately.
async fn serve_upload(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let (stream, size) = match state.storage.open(&path).await {
        Ok(opened) => opened,
        Err(StorageError::NotFound(_)) | Err(StorageError::InvalidPath(_)) => {
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, proxy-revalidate".to_string(),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Create upload-serving routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads/{*path}", get(serve_upload))
}
