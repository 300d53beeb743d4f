//! File upload route
//!
//! Supports two modes: a one-shot multipart upload, and a naive chunked
//! mode where the client splits the file, posts each part with
//! `uploadId`/`chunkIndex`/`totalChunks` fields, and the final part
//! triggers in-order concatenation.

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use keepsake_storage::UploadKind;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::routes::types::{ChunkAck, UploadResponse};
use crate::state::AppState;

/// Upper bound on totalChunks; a 200 KB chunk size puts this at ~2 GB
const MAX_CHUNKS: u32 = 10_000;

#[derive(Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    kind: Option<String>,
    upload_id: Option<String>,
    file_name: Option<String>,
    chunk_index: Option<u32>,
    total_chunks: Option<u32>,
}

fn parse_index(name: &str, raw: &str) -> Result<u32, ApiError> {
    raw.parse::<u32>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", name, raw)))
}

/// POST /api/upload
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                form.file = Some((filename, data));
            }
            "type" => form.kind = Some(field.text().await.unwrap_or_default()),
            "uploadId" => form.upload_id = Some(field.text().await.unwrap_or_default()),
            "fileName" => form.file_name = Some(field.text().await.unwrap_or_default()),
            "chunkIndex" => {
                let raw = field.text().await.unwrap_or_default();
                form.chunk_index = Some(parse_index("chunkIndex", &raw)?);
            }
            "totalChunks" => {
                let raw = field.text().await.unwrap_or_default();
                form.total_chunks = Some(parse_index("totalChunks", &raw)?);
            }
            _ => {}
        }
    }

    let (filename, data) = form
        .file
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let kind: UploadKind = form
        .kind
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(ApiError::Storage)?;

    // Chunked mode kicks in when the chunk bookkeeping fields are present
    if let (Some(upload_id), Some(index), Some(total)) =
        (form.upload_id, form.chunk_index, form.total_chunks)
    {
        if total == 0 || total > MAX_CHUNKS {
            return Err(ApiError::BadRequest(format!(
                "totalChunks must be between 1 and {}",
                MAX_CHUNKS
            )));
        }
        if index >= total {
            return Err(ApiError::BadRequest(format!(
                "chunkIndex {} out of range for {} chunks",
                index, total
            )));
        }

        state.storage.put_chunk(&upload_id, index, data).await?;
        debug!("Received chunk {}/{} of upload {}", index + 1, total, upload_id);

        // The final index triggers assembly; earlier parts just ack
        if index + 1 < total {
            return Ok(Json(ChunkAck {
                success: true,
                chunk_index: index,
            })
            .into_response());
        }

        let hint = form.file_name.unwrap_or(filename);
        let stored = state
            .storage
            .assemble_chunks(&upload_id, total, kind, &hint)
            .await?;
        info!("Assembled chunked upload {} into {}", upload_id, stored.filename);
        metrics::counter!("keepsake_uploads_total").increment(1);

        return Ok(Json(UploadResponse {
            success: true,
            url: stored.url,
            filename: stored.filename,
        })
        .into_response());
    }

    let stored = state.storage.save(kind, &filename, data).await?;
    metrics::counter!("keepsake_uploads_total").increment(1);

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        filename: stored.filename,
    })
    .into_response())
}

/// Create upload routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}
