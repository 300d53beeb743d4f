//! Keepsake Database Layer
//!
//! This crate provides the database abstraction layer for Keepsake,
//! using SQLite via sqlx for persistence. Nested album structures
//! (photo lists, captions, letter notes, settings) are stored as JSON
//! columns and decoded through serde.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{AlbumQuery, Database};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
