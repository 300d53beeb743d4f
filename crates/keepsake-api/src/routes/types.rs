//! Request/Response DTOs for the REST API

use chrono::{DateTime, Utc};
use keepsake_core::AnalyticsSummary;
use keepsake_db::{Album, AnalyticsDay, Category};
use serde::{Deserialize, Serialize};

// ==================== Admin Auth Types ====================

/// Login request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub admin_account: String,
    pub password: String,
}

/// Admin info returned by login/verify
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub admin_account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub admin: AdminInfo,
}

/// Verify response
#[derive(Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub admin: AdminInfo,
}

// ==================== Album Types ====================

/// Pagination envelope
#[derive(Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Public album listing query parameters
#[derive(Deserialize, Default)]
pub struct AlbumsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Public album listing response
#[derive(Serialize)]
pub struct AlbumListResponse {
    pub albums: Vec<Album>,
    pub pagination: Pagination,
}

/// Album creation response
#[derive(Serialize)]
pub struct CreateAlbumResponse {
    pub success: bool,
    pub album: Album,
}

/// Generic success response
#[derive(Serialize)]
pub struct OkResponse {
    pub success: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ==================== Admin Album Types ====================

/// Admin album listing query parameters
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminAlbumsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_admin_limit")]
    pub limit: i64,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

fn default_admin_limit() -> i64 {
    100
}

/// Admin album listing response
#[derive(Serialize)]
pub struct AdminAlbumListResponse {
    pub success: bool,
    pub albums: Vec<Album>,
    pub pagination: Pagination,
}

/// Visibility update request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibilityRequest {
    pub album_id: i64,
    pub is_public: bool,
}

/// Admin album deletion query parameters
#[derive(Deserialize)]
pub struct DeleteAlbumQuery {
    pub id: i64,
}

/// Success response with a message
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ==================== Note Types ====================

/// Note listing query parameters
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesQuery {
    pub album_id: Option<String>,
}

/// Note creation request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub album_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub date: String,
    pub author: String,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

/// Note creation response
#[derive(Serialize)]
pub struct CreateNoteResponse {
    pub success: bool,
    pub note: keepsake_db::Note,
}

// ==================== Analytics Types ====================

/// Analytics query parameters
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Analytics listing response
#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub analytics: Vec<AnalyticsDay>,
    pub aggregated: AnalyticsSummary,
}

/// Event tracking request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub album_id: String,
    pub event_type: String,
    #[serde(default)]
    pub data: Option<keepsake_core::EventData>,
}

// ==================== Category Types ====================

/// Category with its public album count
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: Category,
    pub album_count: i64,
}

// ==================== Upload Types ====================

/// One-shot (and final-chunk) upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
}

/// Ack for a non-final chunk
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkAck {
    pub success: bool,
    pub chunk_index: u32,
}

// ==================== Health Types ====================

/// Database probe result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub albums: i64,
    pub response_time_ms: u64,
}

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub timestamp: DateTime<Utc>,
}
