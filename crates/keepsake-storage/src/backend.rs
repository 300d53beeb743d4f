//! Upload store trait

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;

use crate::error::StorageError;

/// Type alias for a boxed stream of bytes
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Kind of uploaded file, one directory per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatars,
    Albums,
    Audio,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Avatars => "avatars",
            UploadKind::Albums => "albums",
            UploadKind::Audio => "audio",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avatar" | "avatars" => Ok(UploadKind::Avatars),
            "album" | "albums" => Ok(UploadKind::Albums),
            "audio" => Ok(UploadKind::Audio),
            _ => Err(StorageError::InvalidKind(s.to_string())),
        }
    }
}

/// A stored file: the public URL path and the generated filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub url: String,
    pub filename: String,
}

/// Upload store trait
///
/// Implementations persist uploaded files under per-kind directories and
/// expose them by URL path (`/uploads/<kind>/<filename>`).
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Write a complete file, returning its public URL
    async fn save(
        &self,
        kind: UploadKind,
        filename_hint: &str,
        data: Bytes,
    ) -> Result<StoredFile, StorageError>;

    /// Open a stored file for serving; returns a stream and the file size
    async fn open(&self, rel_path: &str) -> Result<(ByteStream, u64), StorageError>;

    /// Delete a stored file by its public URL path (`/uploads/...` only).
    /// Returns false when the path is outside the uploads tree or absent.
    async fn delete_url(&self, url_path: &str) -> Result<bool, StorageError>;

    /// Stage one part of a chunked upload, keyed by the client-supplied index
    async fn put_chunk(
        &self,
        upload_id: &str,
        index: u32,
        data: Bytes,
    ) -> Result<(), StorageError>;

    /// Concatenate staged parts 0..total in index order into a final file
    async fn assemble_chunks(
        &self,
        upload_id: &str,
        total: u32,
        kind: UploadKind,
        filename_hint: &str,
    ) -> Result<StoredFile, StorageError>;

    /// Drop any staged parts for an upload
    async fn discard_chunks(&self, upload_id: &str) -> Result<(), StorageError>;
}

/// Validate a client-supplied upload id (used as a staging directory name)
pub fn validate_upload_id(upload_id: &str) -> Result<(), StorageError> {
    if upload_id.is_empty() || upload_id.len() > 128 {
        return Err(StorageError::InvalidUploadId(upload_id.to_string()));
    }
    if !upload_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        || upload_id.starts_with('.')
    {
        return Err(StorageError::InvalidUploadId(upload_id.to_string()));
    }
    Ok(())
}

/// Extract a safe file extension from a filename hint
pub fn file_extension(filename_hint: &str) -> &str {
    let ext = filename_hint.rsplit('.').next().unwrap_or("bin");
    if ext.is_empty()
        || ext.len() > 10
        || ext == filename_hint
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        "bin"
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_kind_accepts_singular_and_plural() {
        assert_eq!("avatar".parse::<UploadKind>().unwrap(), UploadKind::Avatars);
        assert_eq!("avatars".parse::<UploadKind>().unwrap(), UploadKind::Avatars);
        assert_eq!("album".parse::<UploadKind>().unwrap(), UploadKind::Albums);
        assert_eq!("audio".parse::<UploadKind>().unwrap(), UploadKind::Audio);
        assert!("videos".parse::<UploadKind>().is_err());
    }

    #[test]
    fn upload_ids_are_restricted_to_safe_names() {
        assert!(validate_upload_id("1712000000-ab12cd").is_ok());
        assert!(validate_upload_id("").is_err());
        assert!(validate_upload_id("../escape").is_err());
        assert!(validate_upload_id("a/b").is_err());
        assert!(validate_upload_id(".hidden").is_err());
    }

    #[test]
    fn file_extension_falls_back_to_bin() {
        assert_eq!(file_extension("song.mp3"), "mp3");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "bin");
        assert_eq!(file_extension("trailing."), "bin");
        assert_eq!(file_extension("weird.e!xt"), "bin");
    }
}
