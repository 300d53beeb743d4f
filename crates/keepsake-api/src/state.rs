//! Application state

use keepsake_auth::JwtManager;
use keepsake_core::{AlbumService, AnalyticsService};
use keepsake_db::Database;
use keepsake_storage::UploadStore;
use std::sync::Arc;

/// Handle used to render Prometheus metrics
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub albums: Arc<AlbumService>,
    pub analytics: Arc<AnalyticsService>,
    pub storage: Arc<dyn UploadStore>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(
        db: Database,
        albums: Arc<AlbumService>,
        analytics: Arc<AnalyticsService>,
        storage: Arc<dyn UploadStore>,
        jwt: Arc<JwtManager>,
    ) -> Self {
        Self {
            db,
            albums,
            analytics,
            storage,
            jwt,
        }
    }
}
