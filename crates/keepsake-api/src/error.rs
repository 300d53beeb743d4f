//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Core error: {0}")]
    Core(#[from] keepsake_core::CoreError),

    #[error("Database error: {0}")]
    Database(#[from] keepsake_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] keepsake_auth::AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] keepsake_storage::StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Core(e) => match e {
                keepsake_core::CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                keepsake_core::CoreError::BadRequest(msg) => {
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                keepsake_core::CoreError::AlreadyExists(msg) => {
                    (StatusCode::CONFLICT, msg.clone())
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
            ApiError::Database(e) => match e {
                keepsake_db::DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                keepsake_db::DbError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
            ApiError::Auth(e) => match e {
                keepsake_auth::AuthError::PasswordHash(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                }
                _ => (StatusCode::UNAUTHORIZED, e.to_string()),
            },
            ApiError::Storage(e) => match e {
                keepsake_storage::StorageError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, msg.clone())
                }
                keepsake_storage::StorageError::InvalidKind(msg) => (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid upload type: {}", msg),
                ),
                keepsake_storage::StorageError::InvalidUploadId(msg) => (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid upload id: {}", msg),
                ),
                keepsake_storage::StorageError::MissingChunk { index, total } => (
                    StatusCode::BAD_REQUEST,
                    format!("Missing chunk {} of {}", index, total),
                ),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
