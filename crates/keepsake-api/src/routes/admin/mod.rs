//! Admin API routes
//!
//! Login/verify plus album management (listing including private albums,
//! visibility toggles, cascade deletion).

pub mod albums;
pub mod auth;

use axum::Router;

use crate::state::AppState;

#[allow(unused_imports)]
pub use auth::RequireAdmin;

/// Create admin API routes
pub fn routes() -> Router<AppState> {
    Router::new().merge(auth::routes()).merge(albums::routes())
}
