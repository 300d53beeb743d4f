//! Keepsake Core Business Logic
//!
//! This crate provides the core functionality for Keepsake: the album
//! service (create/fetch/update/delete with a read-through TTL cache),
//! slug generation, and analytics event recording.

pub mod albums;
pub mod analytics;
pub mod cache;
pub mod error;
pub mod slug;

pub use albums::{AlbumService, NewAlbumForm, UploadedFile, PLACEHOLDER_URL};
pub use analytics::{AnalyticsEvent, AnalyticsService, AnalyticsSummary, EventData};
pub use cache::{spawn_purge_task, CacheStats, TtlCache};
pub use error::CoreError;
pub use slug::slugify;
