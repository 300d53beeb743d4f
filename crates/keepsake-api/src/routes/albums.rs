//! Public album routes

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::get,
    Json, Router,
};
use keepsake_core::{NewAlbumForm, UploadedFile};
use keepsake_db::{Album, AlbumQuery, AlbumUpdate, LetterNote, Template};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::routes::types::{
    AlbumListResponse, AlbumsQuery, CreateAlbumResponse, OkResponse, Pagination,
};
use crate::state::AppState;

/// Letter note as submitted by the admin form; older clients send the
/// body as a single string instead of a line array
#[derive(Deserialize)]
struct LetterNoteInput {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: LetterNoteContent,
    #[serde(default)]
    date: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LetterNoteContent {
    Lines(Vec<String>),
    Text(String),
}

impl Default for LetterNoteContent {
    fn default() -> Self {
        LetterNoteContent::Lines(Vec::new())
    }
}

fn parse_letter_notes(raw: &str) -> Result<Vec<LetterNote>, ApiError> {
    let inputs: Vec<LetterNoteInput> = serde_json::from_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid letterNotes: {}", e)))?;

    Ok(inputs
        .into_iter()
        .map(|input| LetterNote {
            title: input.title,
            content: match input.content {
                LetterNoteContent::Lines(lines) => lines,
                LetterNoteContent::Text(text) => vec![text],
            },
            date: input.date,
        })
        .collect())
}

async fn read_file_field(field: axum::extract::multipart::Field<'_>) -> Result<UploadedFile, ApiError> {
    let filename = field.file_name().unwrap_or("upload.bin").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(UploadedFile { filename, data })
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /api/albums - list public albums
async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<AlbumsQuery>,
) -> Result<Json<AlbumListResponse>, ApiError> {
    // A category filter restricts to the category's member albums; an
    // unknown category slug applies no filter
    let slugs = match &query.category {
        Some(category_slug) => state
            .db
            .get_category_by_slug(category_slug)
            .await?
            .map(|category| category.album_slugs),
        None => None,
    };

    let (albums, total) = state
        .db
        .list_albums(AlbumQuery {
            public_only: true,
            search: query.search.clone(),
            slugs,
            page: query.page,
            limit: query.limit,
            ..Default::default()
        })
        .await?;

    Ok(Json(AlbumListResponse {
        albums,
        pagination: Pagination::new(query.page.max(1), query.limit, total),
    }))
}

/// POST /api/albums - create an album from the multipart admin form
async fn create_album(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateAlbumResponse>, ApiError> {
    let mut form = NewAlbumForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = text_field(field).await?,
            "subtitle" => form.subtitle = text_field(field).await?,
            "dayStart" => form.day_start = text_field(field).await?,
            "template" => {
                let raw = text_field(field).await?;
                form.template = raw
                    .parse::<Template>()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid template: {}", raw)))?;
            }
            "quote" => form.quote = text_field(field).await?,
            "letterNotes" => {
                let raw = text_field(field).await?;
                if !raw.is_empty() {
                    form.letter_notes = parse_letter_notes(&raw)?;
                }
            }
            "musicUrl" => form.music_url = Some(text_field(field).await?),
            "malePhoto" => form.male_photo = Some(read_file_field(field).await?),
            "femalePhoto" => form.female_photo = Some(read_file_field(field).await?),
            "photos" => form.photos.push(read_file_field(field).await?),
            "photoNotes" => form.photo_notes.push(text_field(field).await?),
            "music" => form.music = Some(read_file_field(field).await?),
            _ => {
                debug!("Ignoring unknown album form field: {}", name);
            }
        }
    }

    let album = state.albums.create(form).await?;

    Ok(Json(CreateAlbumResponse {
        success: true,
        album,
    }))
}

/// GET /api/albums/{slug} - fetch one album through the cache
async fn get_album(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Album>, ApiError> {
    let album = state.albums.get_by_slug(&slug).await?;
    metrics::counter!("keepsake_album_views_total").increment(1);
    Ok(Json(album))
}

/// PUT /api/albums/{slug} - partial update
async fn update_album(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(update): Json<AlbumUpdate>,
) -> Result<Json<OkResponse>, ApiError> {
    state.albums.update(&slug, &update).await?;
    Ok(Json(OkResponse::ok()))
}

/// DELETE /api/albums/{slug}
async fn delete_album(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state.albums.delete(&slug).await?;
    Ok(Json(OkResponse::ok()))
}

/// Create album routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/albums", get(list_albums).post(create_album))
        .route(
            "/api/albums/{slug}",
            get(get_album).put(update_album).delete(delete_album),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_notes_accept_string_or_line_array() {
        let notes = parse_letter_notes(
            r#"[{"title":"Day One","content":["line 1","line 2"],"date":"14/02/2024"},
                {"title":"Day Two","content":"single line","date":"15/02/2024"}]"#,
        )
        .unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, vec!["line 1", "line 2"]);
        assert_eq!(notes[1].content, vec!["single line"]);
    }

    #[test]
    fn malformed_letter_notes_are_a_bad_request() {
        assert!(parse_letter_notes("not json").is_err());
        assert!(parse_letter_notes(r#"{"title":"not an array"}"#).is_err());
    }

    #[test]
    fn empty_letter_notes_list_parses() {
        assert!(parse_letter_notes("[]").unwrap().is_empty());
    }
}
