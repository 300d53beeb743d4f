//! Local disk upload store

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{
    file_extension, validate_upload_id, ByteStream, StoredFile, UploadKind, UploadStore,
};
use crate::error::StorageError;

/// Local disk upload store
///
/// Stores uploads under `<base_path>/uploads/<kind>/<filename>` and stages
/// chunked uploads under `<base_path>/partial/<upload_id>/`.
pub struct LocalStorage {
    uploads_path: PathBuf,
    partial_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local upload store
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        let uploads_path = base_path.join("uploads");
        let partial_path = base_path.join("partial");

        fs::create_dir_all(&uploads_path).await?;
        fs::create_dir_all(&partial_path).await?;

        info!("Initialized local upload store at {:?}", base_path);

        Ok(Self {
            uploads_path,
            partial_path,
        })
    }

    /// Generate a destination filename: `<kind>-<millis>-<rand>.<ext>`
    fn destination_filename(kind: UploadKind, filename_hint: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.{}",
            kind.as_str(),
            Utc::now().timestamp_millis(),
            &suffix[..8],
            file_extension(filename_hint)
        )
    }

    /// Resolve a relative URL path (`<kind>/<filename>` or
    /// `/uploads/<kind>/<filename>`) inside the uploads directory
    fn resolve(&self, rel_path: &str) -> Result<PathBuf, StorageError> {
        let trimmed = rel_path
            .trim_start_matches('/')
            .trim_start_matches("uploads/");

        let relative = Path::new(trimmed);
        // Reject traversal and absolute components before touching the disk
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(StorageError::InvalidPath(rel_path.to_string())),
            }
        }
        if trimmed.is_empty() {
            return Err(StorageError::InvalidPath(rel_path.to_string()));
        }

        Ok(self.uploads_path.join(relative))
    }

    fn staging_dir(&self, upload_id: &str) -> Result<PathBuf, StorageError> {
        validate_upload_id(upload_id)?;
        Ok(self.partial_path.join(upload_id))
    }

    async fn write_into(&self, kind: UploadKind, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let dir = self.uploads_path.join(kind.as_str());
        fs::create_dir_all(&dir).await?;

        let path = dir.join(filename);
        // Write through a temp file so a crash never leaves a half-written upload
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, &path).await?;
        Ok(path)
    }
}

#[async_trait]
impl UploadStore for LocalStorage {
    async fn save(
        &self,
        kind: UploadKind,
        filename_hint: &str,
        data: Bytes,
    ) -> Result<StoredFile, StorageError> {
        let filename = Self::destination_filename(kind, filename_hint);
        debug!("Saving {} byte upload as {}/{}", data.len(), kind, filename);

        self.write_into(kind, &filename, &data).await?;

        Ok(StoredFile {
            url: format!("/uploads/{}/{}", kind.as_str(), filename),
            filename,
        })
    }

    async fn open(&self, rel_path: &str) -> Result<(ByteStream, u64), StorageError> {
        let path = self.resolve(rel_path)?;
        debug!("Serving upload from {:?}", path);

        let file = File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(rel_path.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        let size = file.metadata().await?.len();

        let reader = BufReader::new(file);
        let stream = tokio_util::io::ReaderStream::new(reader);

        Ok((
            Box::pin(stream.map(|result| result.map_err(StorageError::Io))),
            size,
        ))
    }

    async fn delete_url(&self, url_path: &str) -> Result<bool, StorageError> {
        // Only files published under /uploads/ may be removed
        if !url_path.starts_with("/uploads/") {
            return Ok(false);
        }
        let path = match self.resolve(url_path) {
            Ok(path) => path,
            Err(_) => return Ok(false),
        };
        debug!("Deleting upload at {:?}", path);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn put_chunk(
        &self,
        upload_id: &str,
        index: u32,
        data: Bytes,
    ) -> Result<(), StorageError> {
        let dir = self.staging_dir(upload_id)?;
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.part", index));
        debug!("Staging chunk {} ({} bytes) at {:?}", index, data.len(), path);
        fs::write(&path, &data).await?;
        Ok(())
    }

    async fn assemble_chunks(
        &self,
        upload_id: &str,
        total: u32,
        kind: UploadKind,
        filename_hint: &str,
    ) -> Result<StoredFile, StorageError> {
        let dir = self.staging_dir(upload_id)?;
        let filename = Self::destination_filename(kind, filename_hint);

        let dest_dir = self.uploads_path.join(kind.as_str());
        fs::create_dir_all(&dest_dir).await?;
        let dest_path = dest_dir.join(&filename);
        let temp_path = dest_path.with_extension("tmp");

        let mut out = File::create(&temp_path).await?;
        for index in 0..total {
            let part = dir.join(format!("{}.part", index));
            let data = match fs::read(&part).await {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(StorageError::MissingChunk { index, total });
                }
                Err(e) => {
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(StorageError::Io(e));
                }
            };
            out.write_all(&data).await?;
        }
        out.flush().await?;
        drop(out);

        fs::rename(&temp_path, &dest_path).await?;
        let _ = fs::remove_dir_all(&dir).await;

        debug!(
            "Assembled {} chunks of upload {} into {}",
            total, upload_id, filename
        );

        Ok(StoredFile {
            url: format!("/uploads/{}/{}", kind.as_str(), filename),
            filename,
        })
    }

    async fn discard_chunks(&self, upload_id: &str) -> Result<(), StorageError> {
        let dir = self.staging_dir(upload_id)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    async fn read_stream(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn save_and_open_round_trip() {
        let (_dir, storage) = store().await;

        let stored = storage
            .save(UploadKind::Audio, "song.mp3", Bytes::from_static(b"tune"))
            .await
            .unwrap();
        assert!(stored.url.starts_with("/uploads/audio/audio-"));
        assert!(stored.filename.ends_with(".mp3"));

        let (stream, size) = storage.open(&stored.url).await.unwrap();
        assert_eq!(size, 4);
        assert_eq!(read_stream(stream).await, b"tune");
    }

    #[tokio::test]
    async fn open_rejects_traversal_and_missing_files() {
        let (_dir, storage) = store().await;

        assert!(matches!(
            storage.open("../partial/escape").await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            storage.open("albums/nope.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_url_only_touches_uploads() {
        let (_dir, storage) = store().await;

        let stored = storage
            .save(UploadKind::Albums, "a.jpg", Bytes::from_static(b"img"))
            .await
            .unwrap();

        assert!(!storage.delete_url("/etc/passwd").await.unwrap());
        assert!(!storage.delete_url("/uploads/albums/absent.jpg").await.unwrap());
        assert!(storage.delete_url(&stored.url).await.unwrap());
        assert!(matches!(
            storage.open(&stored.url).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn chunks_assemble_in_index_order() {
        let (_dir, storage) = store().await;

        // Deliver out of order; assembly must follow the indices
        storage
            .put_chunk("up-1", 1, Bytes::from_static(b"world"))
            .await
            .unwrap();
        storage
            .put_chunk("up-1", 0, Bytes::from_static(b"hello "))
            .await
            .unwrap();

        let stored = storage
            .assemble_chunks("up-1", 2, UploadKind::Audio, "greeting.mp3")
            .await
            .unwrap();

        let (stream, _) = storage.open(&stored.url).await.unwrap();
        assert_eq!(read_stream(stream).await, b"hello world");
    }

    #[tokio::test]
    async fn assembly_fails_on_missing_part() {
        let (_dir, storage) = store().await;

        storage
            .put_chunk("gappy", 0, Bytes::from_static(b"a"))
            .await
            .unwrap();
        storage
            .put_chunk("gappy", 2, Bytes::from_static(b"c"))
            .await
            .unwrap();

        let err = storage
            .assemble_chunks("gappy", 3, UploadKind::Audio, "x.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingChunk { index: 1, total: 3 }));
    }

    #[tokio::test]
    async fn discard_chunks_is_idempotent() {
        let (_dir, storage) = store().await;

        storage
            .put_chunk("temp", 0, Bytes::from_static(b"x"))
            .await
            .unwrap();
        storage.discard_chunks("temp").await.unwrap();
        storage.discard_chunks("temp").await.unwrap();

        let err = storage
            .assemble_chunks("temp", 1, UploadKind::Audio, "x.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingChunk { .. }));
    }

    #[tokio::test]
    async fn invalid_upload_ids_are_rejected() {
        let (_dir, storage) = store().await;

        let err = storage
            .put_chunk("../escape", 0, Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidUploadId(_)));
    }
}
