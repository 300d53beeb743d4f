//! Analytics routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use keepsake_core::{AnalyticsEvent, AnalyticsService, EventData};

use crate::error::ApiError;
use crate::routes::types::{AnalyticsQuery, AnalyticsResponse, OkResponse, TrackEventRequest};
use crate::state::AppState;

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date: {}", raw)))
}

/// GET /api/analytics - rows plus an aggregated roll-up
async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    // The range only applies when both ends are present
    let (start, end) = match (&query.start_date, &query.end_date) {
        (Some(start), Some(end)) => (Some(parse_date(start)?), Some(parse_date(end)?)),
        _ => (None, None),
    };

    let rows = state
        .db
        .list_analytics(query.album_id.as_deref(), start, end)
        .await?;
    let aggregated = AnalyticsService::aggregate(&rows);

    Ok(Json(AnalyticsResponse {
        analytics: rows,
        aggregated,
    }))
}

/// POST /api/analytics - track one viewer event
async fn track_event(
    State(state): State<AppState>,
    Json(request): Json<TrackEventRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    if request.album_id.is_empty() || request.event_type.is_empty() {
        return Err(ApiError::BadRequest(
            "albumId and eventType are required".to_string(),
        ));
    }

    let event: AnalyticsEvent = request.event_type.parse()?;
    let data = request.data.unwrap_or_else(EventData::default);

    state.analytics.record(&request.album_id, event, &data).await?;
    metrics::counter!("keepsake_analytics_events_total").increment(1);

    Ok(Json(OkResponse::ok()))
}

/// Create analytics routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/analytics", get(get_analytics).post(track_event))
}
