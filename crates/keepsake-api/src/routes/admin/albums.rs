//! Admin album management routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use keepsake_db::AlbumQuery;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::routes::types::{
    AdminAlbumListResponse, AdminAlbumsQuery, DeleteAlbumQuery, MessageResponse, Pagination,
    SetVisibilityRequest,
};
use crate::state::AppState;

use super::auth::RequireAdmin;

/// GET /api/admin/albums - all albums, including private ones
async fn list_albums(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminAlbumsQuery>,
) -> Result<Json<AdminAlbumListResponse>, ApiError> {
    let (albums, total) = state
        .db
        .list_albums(AlbumQuery {
            is_public: query.is_public,
            search: query.search.clone(),
            search_created_by: true,
            page: query.page,
            limit: query.limit,
            ..Default::default()
        })
        .await?;

    Ok(Json(AdminAlbumListResponse {
        success: true,
        albums,
        pagination: Pagination::new(query.page.max(1), query.limit, total),
    }))
}

/// PUT /api/admin/albums - set album visibility
async fn set_visibility(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(
        "Setting visibility of album {} to {}",
        request.album_id, request.is_public
    );

    state
        .albums
        .set_visibility(request.album_id, request.is_public)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Album updated successfully".to_string(),
    }))
}

/// DELETE /api/admin/albums?id={id} - cascade delete an album
async fn delete_album(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<DeleteAlbumQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.albums.delete_cascade(query.id).await?;

    info!("Admin deleted album {}", query.id);

    Ok(Json(MessageResponse {
        success: true,
        message: "Album and related data deleted successfully".to_string(),
    }))
}

/// Create admin album routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/admin/albums",
        get(list_albums).put(set_visibility).delete(delete_album),
    )
}
