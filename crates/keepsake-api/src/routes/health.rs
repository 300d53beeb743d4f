//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use std::time::Instant;

use crate::routes::types::{DatabaseHealth, HealthResponse};
use crate::state::AppState;

/// Health check handler; probes the database with a trivial query
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    metrics::counter!("keepsake_health_checks_total").increment(1);

    let started = Instant::now();
    match state.db.count_albums().await {
        Ok(albums) => Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseHealth {
                connected: true,
                albums,
                response_time_ms: started.elapsed().as_millis() as u64,
            },
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "unhealthy",
                "error": { "message": e.to_string(), "type": "database_connection_error" },
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
    }
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/healthz", get(health))
}
