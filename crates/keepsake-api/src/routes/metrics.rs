//! Prometheus metrics endpoint

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use crate::state::MetricsHandle;

/// GET /metrics - Prometheus exposition format
async fn render_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Create metrics routes bound to the recorder handle
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(handle)
}
