//! Category routes

use axum::{extract::State, routing::get, Json, Router};

use crate::error::ApiError;
use crate::routes::types::CategoryResponse;
use crate::state::AppState;

/// GET /api/categories - active categories with their public album counts
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.db.list_active_categories().await?;

    let mut out = Vec::with_capacity(categories.len());
    for category in categories {
        let album_count = state.db.count_public_albums_in(&category.album_slugs).await?;
        out.push(CategoryResponse {
            category,
            album_count,
        });
    }

    Ok(Json(out))
}

/// Create category routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/categories", get(list_categories))
}
