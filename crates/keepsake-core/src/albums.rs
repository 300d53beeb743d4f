//! Album service

use bytes::Bytes;
use keepsake_db::{Album, AlbumSettings, AlbumUpdate, Database, LetterNote, NewAlbum, Template};
use keepsake_storage::{StorageError, UploadKind, UploadStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::error::CoreError;
use crate::slug::slugify;

/// URL substituted when an individual upload fails during album creation
pub const PLACEHOLDER_URL: &str = "/uploads/placeholder.jpg";

/// A file received in the album creation form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Parsed album creation form
#[derive(Debug, Clone, Default)]
pub struct NewAlbumForm {
    pub name: String,
    pub subtitle: String,
    pub day_start: String,
    pub template: Template,
    pub quote: String,
    pub letter_notes: Vec<LetterNote>,
    /// URL of music uploaded ahead of time (chunked upload path)
    pub music_url: Option<String>,
    pub male_photo: Option<UploadedFile>,
    pub female_photo: Option<UploadedFile>,
    pub photos: Vec<UploadedFile>,
    /// Caption per photo, aligned with `photos` by index
    pub photo_notes: Vec<String>,
    pub music: Option<UploadedFile>,
}

/// Album operations: creation with file uploads, cached slug lookups,
/// updates and cascade deletion.
pub struct AlbumService {
    db: Database,
    storage: Arc<dyn UploadStore>,
    cache: Arc<TtlCache<Album>>,
}

impl AlbumService {
    pub fn new(db: Database, storage: Arc<dyn UploadStore>, cache: Arc<TtlCache<Album>>) -> Self {
        Self { db, storage, cache }
    }

    /// Create an album from the admin form.
    ///
    /// A failed photo or avatar upload degrades to a placeholder URL rather
    /// than failing the whole album; a failed music upload drops the track.
    pub async fn create(&self, form: NewAlbumForm) -> Result<Album, CoreError> {
        if form.name.trim().is_empty()
            || form.day_start.is_empty()
            || form.male_photo.is_none()
            || form.female_photo.is_none()
            || form.photos.is_empty()
        {
            return Err(CoreError::BadRequest("Missing required fields".to_string()));
        }

        let slug = slugify(&form.name);
        if slug.is_empty() {
            return Err(CoreError::BadRequest(
                "Album name must contain letters or digits".to_string(),
            ));
        }
        if self.db.slug_exists(&slug).await? {
            return Err(CoreError::AlreadyExists(format!(
                "Album with this name already exists: {}",
                slug
            )));
        }

        // Upload photos; captions stay keyed by photo index
        let mut photo_urls = Vec::with_capacity(form.photos.len());
        let mut messages = BTreeMap::new();
        for (i, photo) in form.photos.iter().enumerate() {
            let note = form.photo_notes.get(i).cloned().unwrap_or_default();
            let url = match self
                .storage
                .save(UploadKind::Albums, &photo.filename, photo.data.clone())
                .await
            {
                Ok(stored) => stored.url,
                Err(e) => {
                    warn!("Failed to upload photo {}: {}", i, e);
                    PLACEHOLDER_URL.to_string()
                }
            };
            photo_urls.push(url);
            messages.insert(i.to_string(), note);
        }

        let male_avatar = self
            .upload_or_placeholder(UploadKind::Avatars, form.male_photo.as_ref())
            .await;
        let female_avatar = self
            .upload_or_placeholder(UploadKind::Avatars, form.female_photo.as_ref())
            .await;

        // A pre-uploaded music URL wins over an inline music file
        let music = match (&form.music_url, &form.music) {
            (Some(url), _) if !url.is_empty() => Some(url.clone()),
            (_, Some(file)) if !file.data.is_empty() => {
                match self
                    .storage
                    .save(UploadKind::Audio, &file.filename, file.data.clone())
                    .await
                {
                    Ok(stored) => Some(stored.url),
                    Err(e) => {
                        warn!("Failed to upload music file: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        let cover_image = photo_urls.first().cloned().unwrap_or_default();

        let album = self
            .db
            .insert_album(NewAlbum {
                slug: slug.clone(),
                name: form.name,
                subtitle: form.subtitle,
                day_start: form.day_start,
                template: form.template,
                cover_image,
                male_avatar,
                female_avatar,
                photos: photo_urls,
                messages,
                quote: form.quote,
                letter_notes: form.letter_notes,
                music,
                is_public: true,
                created_by: "admin".to_string(),
                tags: vec![],
                settings: AlbumSettings::default(),
            })
            .await?;

        info!("Created album: {}", album.slug);
        Ok(album)
    }

    async fn upload_or_placeholder(
        &self,
        kind: UploadKind,
        file: Option<&UploadedFile>,
    ) -> String {
        let Some(file) = file else {
            return PLACEHOLDER_URL.to_string();
        };
        match self.storage.save(kind, &file.filename, file.data.clone()).await {
            Ok(stored) => stored.url,
            Err(e) => {
                warn!("Failed to upload {} file: {}", kind, e);
                PLACEHOLDER_URL.to_string()
            }
        }
    }

    /// Fetch an album by slug through the cache, counting the view.
    ///
    /// A cache hit skips the database entirely, including the view counter
    /// update; only uncached reads are counted.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Album, CoreError> {
        if let Some(album) = self.cache.get(slug) {
            debug!("Cache hit for album: {}", slug);
            metrics::counter!("keepsake_album_cache_hits_total").increment(1);
            return Ok(album);
        }

        debug!("Cache miss for album: {} - fetching from database", slug);
        metrics::counter!("keepsake_album_cache_misses_total").increment(1);
        let album = self
            .db
            .get_album_by_slug(slug)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Album: {}", slug)))?;

        self.db.increment_album_views(slug).await?;
        self.cache.insert(slug.to_string(), album.clone());

        Ok(album)
    }

    /// Apply a partial update and invalidate the cached entry
    pub async fn update(&self, slug: &str, update: &AlbumUpdate) -> Result<(), CoreError> {
        let matched = self.db.update_album(slug, update).await?;
        if !matched {
            return Err(CoreError::NotFound(format!("Album: {}", slug)));
        }
        self.cache.remove(slug);
        Ok(())
    }

    /// Delete an album by slug and invalidate the cached entry
    pub async fn delete(&self, slug: &str) -> Result<(), CoreError> {
        let deleted = self.db.delete_album_by_slug(slug).await?;
        if !deleted {
            return Err(CoreError::NotFound(format!("Album: {}", slug)));
        }
        self.cache.remove(slug);
        info!("Deleted album: {}", slug);
        Ok(())
    }

    /// Set visibility by ID (admin listing)
    pub async fn set_visibility(&self, id: i64, is_public: bool) -> Result<(), CoreError> {
        let album = self
            .db
            .get_album_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Album: {}", id)))?;

        self.db.set_album_visibility(id, is_public).await?;
        self.cache.remove(&album.slug);
        Ok(())
    }

    /// Delete an album by ID along with its files, notes and analytics.
    ///
    /// Per-file delete errors are logged and skipped; only URLs under
    /// `/uploads/` are touched.
    pub async fn delete_cascade(&self, id: i64) -> Result<(), CoreError> {
        let album = self
            .db
            .get_album_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Album: {}", id)))?;

        // Collect every file the album references
        let mut file_urls: Vec<&str> = Vec::new();
        let mut candidates: Vec<&str> = vec![
            album.cover_image.as_str(),
            album.male_avatar.as_str(),
            album.female_avatar.as_str(),
        ];
        candidates.extend(album.photos.iter().map(|p| p.as_str()));
        if let Some(music) = &album.music {
            candidates.push(music.as_str());
        }
        for url in candidates {
            if url.starts_with("/uploads/") && url != PLACEHOLDER_URL && !file_urls.contains(&url) {
                file_urls.push(url);
            }
        }

        for url in file_urls {
            match self.storage.delete_url(url).await {
                Ok(_) => {}
                Err(StorageError::NotFound(_)) => {}
                Err(e) => warn!("Failed to delete file {}: {}", url, e),
            }
        }

        let analytics = self.db.delete_analytics_for_album(&album.slug).await?;
        let notes = self.db.delete_notes_for_album(&album.slug).await?;
        self.db.delete_album_by_id(id).await?;
        self.cache.remove(&album.slug);

        info!(
            "Deleted album {} with {} analytics rows and {} notes",
            album.slug, analytics, notes
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_storage::LocalStorage;
    use std::time::Duration;

    async fn service() -> (tempfile::TempDir, AlbumService, Database, Arc<TtlCache<Album>>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path().join("store")).await.unwrap());

        let db_url = format!("sqlite:{}?mode=rwc", dir.path().join("test.db").display());
        let db = Database::new(&db_url).await.unwrap();

        let cache = Arc::new(TtlCache::new(Duration::from_secs(300)));
        let service = AlbumService::new(db.clone(), storage, cache.clone());
        (dir, service, db, cache)
    }

    fn file(name: &str, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            data: Bytes::from_static(bytes),
        }
    }

    fn sample_form(name: &str) -> NewAlbumForm {
        NewAlbumForm {
            name: name.to_string(),
            subtitle: "subtitle".to_string(),
            day_start: "2024-02-14".to_string(),
            template: Template::Template1,
            quote: "always".to_string(),
            male_photo: Some(file("him.jpg", b"him")),
            female_photo: Some(file("her.jpg", b"her")),
            photos: vec![file("p0.jpg", b"zero"), file("p1.jpg", b"one")],
            photo_notes: vec!["first".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_uploads_files_and_builds_captions() {
        let (_dir, service, _db, _cache) = service().await;

        let album = service.create(sample_form("Our Story")).await.unwrap();
        assert_eq!(album.slug, "our-story");
        assert_eq!(album.photos.len(), 2);
        assert!(album.photos[0].starts_with("/uploads/albums/"));
        assert_eq!(album.cover_image, album.photos[0]);
        assert!(album.male_avatar.starts_with("/uploads/avatars/"));
        assert_eq!(album.messages.get("0").unwrap(), "first");
        // Missing caption for photo 1 defaults to empty
        assert_eq!(album.messages.get("1").unwrap(), "");
        assert!(album.music.is_none());
        assert!(album.is_public);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_and_duplicates() {
        let (_dir, service, _db, _cache) = service().await;

        let mut missing = sample_form("No Photos");
        missing.photos.clear();
        assert!(matches!(
            service.create(missing).await,
            Err(CoreError::BadRequest(_))
        ));

        assert!(matches!(
            service.create(sample_form("!!!")).await,
            Err(CoreError::BadRequest(_))
        ));

        service.create(sample_form("Twice")).await.unwrap();
        assert!(matches!(
            service.create(sample_form("Twice")).await,
            Err(CoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn pre_uploaded_music_url_short_circuits_upload() {
        let (_dir, service, _db, _cache) = service().await;

        let mut form = sample_form("With Music");
        form.music_url = Some("/uploads/audio/audio-1.mp3".to_string());
        form.music = Some(file("ignored.mp3", b"bytes"));

        let album = service.create(form).await.unwrap();
        assert_eq!(album.music.as_deref(), Some("/uploads/audio/audio-1.mp3"));
    }

    #[tokio::test]
    async fn slug_lookup_counts_views_only_on_cache_miss() {
        let (_dir, service, db, cache) = service().await;
        service.create(sample_form("Viewed")).await.unwrap();

        let first = service.get_by_slug("viewed").await.unwrap();
        assert_eq!(first.views, 0);

        // Second read is served from the cache: no extra view
        service.get_by_slug("viewed").await.unwrap();
        let stored = db.get_album_by_slug("viewed").await.unwrap().unwrap();
        assert_eq!(stored.views, 1);

        // Expired/invalidated cache counts again
        cache.remove("viewed");
        service.get_by_slug("viewed").await.unwrap();
        let stored = db.get_album_by_slug("viewed").await.unwrap().unwrap();
        assert_eq!(stored.views, 2);

        assert!(matches!(
            service.get_by_slug("absent").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete_invalidate_the_cache() {
        let (_dir, service, db, cache) = service().await;
        service.create(sample_form("Cached")).await.unwrap();
        service.get_by_slug("cached").await.unwrap();
        assert_eq!(cache.len(), 1);

        service
            .update(
                "cached",
                &AlbumUpdate {
                    quote: Some("new quote".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cache.is_empty());
        assert_eq!(
            db.get_album_by_slug("cached").await.unwrap().unwrap().quote,
            "new quote"
        );

        service.get_by_slug("cached").await.unwrap();
        service.delete("cached").await.unwrap();
        assert!(cache.is_empty());
        assert!(matches!(
            service.delete("cached").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cascade_delete_removes_files_notes_and_analytics() {
        let (_dir, service, db, _cache) = service().await;
        let album = service.create(sample_form("Doomed")).await.unwrap();

        db.insert_note(keepsake_db::NewNote {
            album_slug: album.slug.clone(),
            title: "t".to_string(),
            content: "c".to_string(),
            date: String::new(),
            author: "a".to_string(),
            is_public: true,
        })
        .await
        .unwrap();
        db.find_or_create_analytics_day(&album.slug, chrono::Utc::now().date_naive())
            .await
            .unwrap();

        let photo_url = album.photos[0].clone();
        service.delete_cascade(album.id).await.unwrap();

        assert!(db.get_album_by_id(album.id).await.unwrap().is_none());
        assert!(db
            .list_notes_for_album(&album.slug, false)
            .await
            .unwrap()
            .is_empty());
        assert!(db
            .list_analytics(Some(&album.slug), None, None)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            service.storage.open(&photo_url).await,
            Err(StorageError::NotFound(_))
        ));

        assert!(matches!(
            service.delete_cascade(album.id).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
