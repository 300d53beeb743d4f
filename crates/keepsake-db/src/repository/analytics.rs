//! Analytics operations

use chrono::NaiveDate;
use sqlx::Row;

use crate::error::DbError;
use crate::models::AnalyticsDay;
use crate::repository::Database;

impl Database {
    // ==================== Analytics Operations ====================

    /// Get the analytics row for an album on a given day
    pub async fn get_analytics_day(
        &self,
        album_slug: &str,
        date: NaiveDate,
    ) -> Result<Option<AnalyticsDay>, DbError> {
        let result = sqlx::query("SELECT * FROM analytics WHERE album_slug = ? AND date = ?")
            .bind(album_slug)
            .bind(date.format("%Y-%m-%d").to_string())
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| AnalyticsDay::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get or create the analytics row for an album on a given day
    pub async fn find_or_create_analytics_day(
        &self,
        album_slug: &str,
        date: NaiveDate,
    ) -> Result<AnalyticsDay, DbError> {
        if let Some(day) = self.get_analytics_day(album_slug, date).await? {
            return Ok(day);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO analytics (album_slug, date)
            VALUES (?, ?)
            ON CONFLICT(album_slug, date) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(album_slug)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await?;

        match result {
            Some(row) => Ok(AnalyticsDay {
                id: row.get("id"),
                album_slug: album_slug.to_string(),
                date,
                views: 0,
                unique_views: 0,
                time_spent: 0,
                music_plays: 0,
                note_views: 0,
                share_count: 0,
                photo_views: Default::default(),
            }),
            // Lost the insert race; the row exists now
            None => self
                .get_analytics_day(album_slug, date)
                .await?
                .ok_or_else(|| DbError::NotFound(format!("analytics day for {}", album_slug))),
        }
    }

    /// Persist updated counters for a day
    pub async fn save_analytics_day(&self, day: &AnalyticsDay) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE analytics
            SET views = ?, unique_views = ?, time_spent = ?, music_plays = ?,
                note_views = ?, share_count = ?, photo_views = ?
            WHERE id = ?
            "#,
        )
        .bind(day.views)
        .bind(day.unique_views)
        .bind(day.time_spent)
        .bind(day.music_plays)
        .bind(day.note_views)
        .bind(day.share_count)
        .bind(serde_json::to_string(&day.photo_views).unwrap_or_else(|_| "{}".into()))
        .bind(day.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List analytics rows, optionally filtered by album and date range, newest first
    pub async fn list_analytics(
        &self,
        album_slug: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<AnalyticsDay>, DbError> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(slug) = album_slug {
            conditions.push("album_slug = ?");
            params.push(slug.to_string());
        }
        if let Some(start) = start {
            conditions.push("date >= ?");
            params.push(start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = end {
            conditions.push("date <= ?");
            params.push(end.format("%Y-%m-%d").to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT * FROM analytics {} ORDER BY date DESC", where_clause);
        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = rows_query.bind(param);
        }

        let rows = rows_query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| AnalyticsDay::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete all analytics rows for an album, returning the number removed
    pub async fn delete_analytics_for_album(&self, album_slug: &str) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM analytics WHERE album_slug = ?")
            .bind(album_slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_database;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn find_or_create_is_idempotent_per_day() {
        let db = test_database().await;
        let first = db
            .find_or_create_analytics_day("a", date("2024-02-14"))
            .await
            .unwrap();
        let second = db
            .find_or_create_analytics_day("a", date("2024-02-14"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let other_day = db
            .find_or_create_analytics_day("a", date("2024-02-15"))
            .await
            .unwrap();
        assert_ne!(first.id, other_day.id);
    }

    #[tokio::test]
    async fn counters_round_trip_including_photo_views() {
        let db = test_database().await;
        let mut day = db
            .find_or_create_analytics_day("a", date("2024-02-14"))
            .await
            .unwrap();

        day.views = 3;
        day.time_spent = 120;
        day.photo_views.insert("0".to_string(), 2);
        day.photo_views.insert("4".to_string(), 1);
        db.save_analytics_day(&day).await.unwrap();

        let fetched = db
            .get_analytics_day("a", date("2024-02-14"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.views, 3);
        assert_eq!(fetched.time_spent, 120);
        assert_eq!(fetched.photo_views.get("0"), Some(&2));
        assert_eq!(fetched.photo_views.get("4"), Some(&1));
    }

    #[tokio::test]
    async fn listing_filters_by_album_and_range() {
        let db = test_database().await;
        for (slug, d) in [
            ("a", "2024-02-13"),
            ("a", "2024-02-14"),
            ("a", "2024-02-15"),
            ("b", "2024-02-14"),
        ] {
            db.find_or_create_analytics_day(slug, date(d)).await.unwrap();
        }

        let all_a = db.list_analytics(Some("a"), None, None).await.unwrap();
        assert_eq!(all_a.len(), 3);
        // Newest first
        assert_eq!(all_a[0].date, date("2024-02-15"));

        let ranged = db
            .list_analytics(Some("a"), Some(date("2024-02-14")), Some(date("2024-02-15")))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);

        let removed = db.delete_analytics_for_album("a").await.unwrap();
        assert_eq!(removed, 3);
        assert_eq!(db.list_analytics(None, None, None).await.unwrap().len(), 1);
    }
}
