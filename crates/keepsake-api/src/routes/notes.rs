//! Note routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use keepsake_db::{NewNote, Note};

use crate::error::ApiError;
use crate::routes::types::{CreateNoteRequest, CreateNoteResponse, NotesQuery};
use crate::state::AppState;

/// GET /api/notes?albumId={slug} - public notes for an album
async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let album_slug = query
        .album_id
        .filter(|slug| !slug.is_empty())
        .ok_or_else(|| ApiError::BadRequest("albumId is required".to_string()))?;

    let notes = state.db.list_notes_for_album(&album_slug, true).await?;
    Ok(Json(notes))
}

/// POST /api/notes - create a note
async fn create_note(
    State(state): State<AppState>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<Json<CreateNoteResponse>, ApiError> {
    if request.album_id.is_empty()
        || request.title.is_empty()
        || request.content.is_empty()
        || request.author.is_empty()
    {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let note = state
        .db
        .insert_note(NewNote {
            album_slug: request.album_id,
            title: request.title,
            content: request.content,
            date: request.date,
            author: request.author,
            is_public: request.is_public,
        })
        .await?;

    Ok(Json(CreateNoteResponse {
        success: true,
        note,
    }))
}

/// Create note routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/notes", get(list_notes).post(create_note))
}
