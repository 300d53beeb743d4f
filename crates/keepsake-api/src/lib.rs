//! Keepsake REST API
//!
//! This crate provides the Axum-based HTTP API for Keepsake: the public
//! album/notes/analytics endpoints, the admin management API, file
//! uploads and upload serving, and the embedded static frontend.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
