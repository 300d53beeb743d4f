//! Analytics event recording and aggregation

use chrono::Utc;
use keepsake_db::{AnalyticsDay, Database};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use crate::error::CoreError;

/// Trackable viewer events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    View,
    UniqueView,
    TimeSpent,
    PhotoView,
    MusicPlay,
    NoteView,
    Share,
}

impl FromStr for AnalyticsEvent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(AnalyticsEvent::View),
            "uniqueView" => Ok(AnalyticsEvent::UniqueView),
            "timeSpent" => Ok(AnalyticsEvent::TimeSpent),
            "photoView" => Ok(AnalyticsEvent::PhotoView),
            "musicPlay" => Ok(AnalyticsEvent::MusicPlay),
            "noteView" => Ok(AnalyticsEvent::NoteView),
            "share" => Ok(AnalyticsEvent::Share),
            _ => Err(CoreError::BadRequest(format!("Unknown event type: {}", s))),
        }
    }
}

/// Event payload; fields are event-specific
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// Seconds, for timeSpent events
    #[serde(default)]
    pub duration: Option<i64>,
    /// Photo index, for photoView events
    #[serde(default)]
    pub photo_index: Option<serde_json::Value>,
}

impl EventData {
    /// Normalize the photo index, which clients send as string or number
    fn photo_index_key(&self) -> Option<String> {
        match &self.photo_index {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Aggregated roll-up across analytics rows
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub total_unique_views: i64,
    pub total_time_spent: i64,
    pub total_music_plays: i64,
    pub total_note_views: i64,
    pub total_shares: i64,
    pub photo_views: BTreeMap<String, i64>,
}

/// Records viewer events into per-day counters
pub struct AnalyticsService {
    db: Database,
}

impl AnalyticsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Apply one event to today's counters for the album
    pub async fn record(
        &self,
        album_slug: &str,
        event: AnalyticsEvent,
        data: &EventData,
    ) -> Result<(), CoreError> {
        let today = Utc::now().date_naive();
        let mut day = self
            .db
            .find_or_create_analytics_day(album_slug, today)
            .await?;

        match event {
            AnalyticsEvent::View => day.views += 1,
            AnalyticsEvent::UniqueView => day.unique_views += 1,
            AnalyticsEvent::TimeSpent => day.time_spent += data.duration.unwrap_or(0),
            AnalyticsEvent::PhotoView => {
                if let Some(key) = data.photo_index_key() {
                    *day.photo_views.entry(key).or_insert(0) += 1;
                }
            }
            AnalyticsEvent::MusicPlay => day.music_plays += 1,
            AnalyticsEvent::NoteView => day.note_views += 1,
            AnalyticsEvent::Share => day.share_count += 1,
        }

        debug!("Recorded {:?} event for album {}", event, album_slug);
        self.db.save_analytics_day(&day).await?;
        Ok(())
    }

    /// Roll analytics rows up into totals
    pub fn aggregate(days: &[AnalyticsDay]) -> AnalyticsSummary {
        let mut summary = AnalyticsSummary::default();
        for day in days {
            summary.total_views += day.views;
            summary.total_unique_views += day.unique_views;
            summary.total_time_spent += day.time_spent;
            summary.total_music_plays += day.music_plays;
            summary.total_note_views += day.note_views;
            summary.total_shares += day.share_count;
            for (index, count) in &day.photo_views {
                *summary.photo_views.entry(index.clone()).or_insert(0) += count;
            }
        }
        summary
    }
}
