//! Album operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Album, AlbumUpdate, NewAlbum};
use crate::repository::Database;

/// Query parameters for listing albums
#[derive(Debug, Clone, Default)]
pub struct AlbumQuery {
    /// Restrict to published albums
    pub public_only: bool,
    /// Explicit visibility filter (admin listing)
    pub is_public: Option<bool>,
    /// Case-insensitive match over name, subtitle and tags
    pub search: Option<String>,
    /// Also match the search term against created_by (admin listing)
    pub search_created_by: bool,
    /// Restrict to these slugs (category filter); empty vec matches nothing
    pub slugs: Option<Vec<String>>,
    /// 1-based page number
    pub page: i64,
    /// Page size
    pub limit: i64,
}

impl AlbumQuery {
    /// Validates and normalizes the query parameters
    pub fn validated(mut self) -> Self {
        if self.page < 1 {
            self.page = 1;
        }
        if self.limit <= 0 {
            self.limit = 10;
        } else if self.limit > 100 {
            self.limit = 100;
        }
        self
    }

    fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Database {
    // ==================== Album Operations ====================

    /// Insert a new album
    pub async fn insert_album(&self, album: NewAlbum) -> Result<Album, DbError> {
        let now = Utc::now();

        if self.slug_exists(&album.slug).await? {
            return Err(DbError::Duplicate(format!(
                "Album '{}' already exists",
                album.slug
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO albums (slug, name, subtitle, day_start, template, cover_image,
                                male_avatar, female_avatar, photos, messages, quote,
                                letter_notes, music, is_public, views, likes, created_by,
                                tags, settings, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&album.slug)
        .bind(&album.name)
        .bind(&album.subtitle)
        .bind(&album.day_start)
        .bind(album.template.as_str())
        .bind(&album.cover_image)
        .bind(&album.male_avatar)
        .bind(&album.female_avatar)
        .bind(serde_json::to_string(&album.photos).unwrap_or_else(|_| "[]".into()))
        .bind(serde_json::to_string(&album.messages).unwrap_or_else(|_| "{}".into()))
        .bind(&album.quote)
        .bind(serde_json::to_string(&album.letter_notes).unwrap_or_else(|_| "[]".into()))
        .bind(&album.music)
        .bind(album.is_public)
        .bind(&album.created_by)
        .bind(serde_json::to_string(&album.tags).unwrap_or_else(|_| "[]".into()))
        .bind(serde_json::to_string(&album.settings).unwrap_or_else(|_| "{}".into()))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Album {
            id,
            slug: album.slug,
            name: album.name,
            subtitle: album.subtitle,
            day_start: album.day_start,
            template: album.template,
            cover_image: album.cover_image,
            male_avatar: album.male_avatar,
            female_avatar: album.female_avatar,
            photos: album.photos,
            messages: album.messages,
            quote: album.quote,
            letter_notes: album.letter_notes,
            music: album.music,
            is_public: album.is_public,
            views: 0,
            likes: 0,
            created_by: album.created_by,
            tags: album.tags,
            settings: album.settings,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check whether a slug is already taken
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM albums WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }

    /// Get an album by slug
    pub async fn get_album_by_slug(&self, slug: &str) -> Result<Option<Album>, DbError> {
        let result = sqlx::query("SELECT * FROM albums WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Album::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get an album by ID
    pub async fn get_album_by_id(&self, id: i64) -> Result<Option<Album>, DbError> {
        let result = sqlx::query("SELECT * FROM albums WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Album::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List albums with filtering and pagination, newest first
    pub async fn list_albums(&self, query: AlbumQuery) -> Result<(Vec<Album>, i64), DbError> {
        let query = query.validated();

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if query.public_only {
            conditions.push("is_public = 1".to_string());
        } else if let Some(is_public) = query.is_public {
            conditions.push(format!("is_public = {}", if is_public { 1 } else { 0 }));
        }

        if let Some(search) = &query.search {
            let like = format!("%{}%", search);
            let mut or_parts = vec![
                "name LIKE ? COLLATE NOCASE",
                "subtitle LIKE ? COLLATE NOCASE",
                "tags LIKE ? COLLATE NOCASE",
            ];
            if query.search_created_by {
                or_parts.push("created_by LIKE ? COLLATE NOCASE");
            }
            conditions.push(format!("({})", or_parts.join(" OR ")));
            for _ in 0..or_parts.len() {
                params.push(like.clone());
            }
        }

        if let Some(slugs) = &query.slugs {
            if slugs.is_empty() {
                return Ok((Vec::new(), 0));
            }
            let marks = vec!["?"; slugs.len()].join(", ");
            conditions.push(format!("slug IN ({})", marks));
            params.extend(slugs.iter().cloned());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // Get total count
        let count_sql = format!("SELECT COUNT(*) as count FROM albums {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("count");

        // Get the page
        let sql = format!(
            "SELECT * FROM albums {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = rows_query.bind(param);
        }
        rows_query = rows_query.bind(query.limit).bind(query.offset());

        let rows = rows_query.fetch_all(&self.pool).await?;
        let albums: Result<Vec<Album>, _> = rows
            .iter()
            .map(|row| Album::try_from(row).map_err(DbError::from))
            .collect();

        Ok((albums?, total))
    }

    /// Apply a partial update to an album, bumping updated_at
    pub async fn update_album(&self, slug: &str, update: &AlbumUpdate) -> Result<bool, DbError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        macro_rules! set_text {
            ($field:expr, $column:literal) => {
                if let Some(value) = &$field {
                    sets.push(concat!($column, " = ?"));
                    params.push(value.clone());
                }
            };
        }
        macro_rules! set_json {
            ($field:expr, $column:literal) => {
                if let Some(value) = &$field {
                    sets.push(concat!($column, " = ?"));
                    params.push(serde_json::to_string(value).unwrap_or_default());
                }
            };
        }

        set_text!(update.name, "name");
        set_text!(update.subtitle, "subtitle");
        set_text!(update.day_start, "day_start");
        if let Some(template) = update.template {
            sets.push("template = ?");
            params.push(template.as_str().to_string());
        }
        set_text!(update.cover_image, "cover_image");
        set_text!(update.male_avatar, "male_avatar");
        set_text!(update.female_avatar, "female_avatar");
        set_json!(update.photos, "photos");
        set_json!(update.messages, "messages");
        set_text!(update.quote, "quote");
        set_json!(update.letter_notes, "letter_notes");
        set_text!(update.music, "music");
        if let Some(is_public) = update.is_public {
            sets.push("is_public = ?");
            params.push(if is_public { "1" } else { "0" }.to_string());
        }
        set_json!(update.tags, "tags");
        set_json!(update.settings, "settings");

        if sets.is_empty() {
            // Nothing to change; still report whether the album exists
            return self.slug_exists(slug).await;
        }

        let sql = format!(
            "UPDATE albums SET {}, updated_at = ? WHERE slug = ?",
            sets.join(", ")
        );
        let mut update_query = sqlx::query(&sql);
        for param in &params {
            update_query = update_query.bind(param);
        }
        update_query = update_query.bind(Utc::now().to_rfc3339()).bind(slug);

        let result = update_query.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set album visibility by ID
    pub async fn set_album_visibility(&self, id: i64, is_public: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE albums SET is_public = ?, updated_at = ? WHERE id = ?")
            .bind(is_public)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the view counter for an album
    pub async fn increment_album_views(&self, slug: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE albums SET views = views + 1 WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete an album by slug
    pub async fn delete_album_by_slug(&self, slug: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM albums WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an album by ID
    pub async fn delete_album_by_id(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count albums (used by the health check)
    pub async fn count_albums(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM albums")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// Count published albums among the given slugs
    pub async fn count_public_albums_in(&self, slugs: &[String]) -> Result<i64, DbError> {
        if slugs.is_empty() {
            return Ok(0);
        }
        let marks = vec!["?"; slugs.len()].join(", ");
        let sql = format!(
            "SELECT COUNT(*) as count FROM albums WHERE is_public = 1 AND slug IN ({})",
            marks
        );
        let mut count_query = sqlx::query(&sql);
        for slug in slugs {
            count_query = count_query.bind(slug);
        }
        let result = count_query.fetch_one(&self.pool).await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlbumSettings, Template};
    use crate::repository::test_database;
    use std::collections::BTreeMap;

    fn sample_album(slug: &str) -> NewAlbum {
        NewAlbum {
            slug: slug.to_string(),
            name: "Our First Year".to_string(),
            subtitle: "twelve months together".to_string(),
            day_start: "2024-02-14".to_string(),
            template: Template::Template1,
            cover_image: "/uploads/albums/albums-1.jpg".to_string(),
            male_avatar: "/uploads/avatars/avatars-1.jpg".to_string(),
            female_avatar: "/uploads/avatars/avatars-2.jpg".to_string(),
            photos: vec![
                "/uploads/albums/albums-1.jpg".to_string(),
                "/uploads/albums/albums-2.jpg".to_string(),
            ],
            messages: BTreeMap::from([
                ("0".to_string(), "the day we met".to_string()),
                ("1".to_string(), "our first trip".to_string()),
            ]),
            quote: "always".to_string(),
            letter_notes: vec![],
            music: None,
            is_public: true,
            created_by: "admin".to_string(),
            tags: vec!["anniversary".to_string()],
            settings: AlbumSettings::default(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trips_json_columns() {
        let db = test_database().await;
        let inserted = db.insert_album(sample_album("our-first-year")).await.unwrap();

        let fetched = db
            .get_album_by_slug("our-first-year")
            .await
            .unwrap()
            .expect("album exists");

        assert_eq!(fetched.id, inserted.id);
        assert_eq!(fetched.photos.len(), 2);
        assert_eq!(fetched.messages.get("0").unwrap(), "the day we met");
        assert_eq!(fetched.tags, vec!["anniversary"]);
        assert!(fetched.settings.auto_play);
        assert_eq!(fetched.views, 0);
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let db = test_database().await;
        db.insert_album(sample_album("dup")).await.unwrap();

        let err = db.insert_album(sample_album("dup")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn list_albums_filters_and_paginates() {
        let db = test_database().await;
        for i in 0..3 {
            db.insert_album(sample_album(&format!("public-{}", i)))
                .await
                .unwrap();
        }
        let mut private = sample_album("hidden");
        private.is_public = false;
        db.insert_album(private).await.unwrap();

        let (public, total) = db
            .list_albums(AlbumQuery {
                public_only: true,
                page: 1,
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(public.len(), 2);

        let (all, total_all) = db
            .list_albums(AlbumQuery {
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total_all, 4);
        assert_eq!(all.len(), 4);

        let (hidden_only, _) = db
            .list_albums(AlbumQuery {
                is_public: Some(false),
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hidden_only.len(), 1);
        assert_eq!(hidden_only[0].slug, "hidden");
    }

    #[tokio::test]
    async fn search_matches_name_case_insensitively() {
        let db = test_database().await;
        db.insert_album(sample_album("searched")).await.unwrap();

        let (found, total) = db
            .list_albums(AlbumQuery {
                public_only: true,
                search: Some("FIRST year".to_string()),
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].slug, "searched");
    }

    #[tokio::test]
    async fn slug_filter_with_no_members_matches_nothing() {
        let db = test_database().await;
        db.insert_album(sample_album("lonely")).await.unwrap();

        let (albums, total) = db
            .list_albums(AlbumQuery {
                public_only: true,
                slugs: Some(vec![]),
                page: 1,
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(albums.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn partial_update_touches_only_named_fields() {
        let db = test_database().await;
        db.insert_album(sample_album("edited")).await.unwrap();

        let updated = db
            .update_album(
                "edited",
                &AlbumUpdate {
                    quote: Some("forever".to_string()),
                    is_public: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let album = db.get_album_by_slug("edited").await.unwrap().unwrap();
        assert_eq!(album.quote, "forever");
        assert!(!album.is_public);
        assert_eq!(album.name, "Our First Year");

        let missing = db
            .update_album("missing", &AlbumUpdate::default())
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn views_increment_and_delete() {
        let db = test_database().await;
        db.insert_album(sample_album("counted")).await.unwrap();

        db.increment_album_views("counted").await.unwrap();
        db.increment_album_views("counted").await.unwrap();

        let album = db.get_album_by_slug("counted").await.unwrap().unwrap();
        assert_eq!(album.views, 2);

        assert!(db.delete_album_by_slug("counted").await.unwrap());
        assert!(!db.delete_album_by_slug("counted").await.unwrap());
    }
}
