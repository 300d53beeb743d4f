//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid upload kind: {0}")]
    InvalidKind(String),

    #[error("Invalid upload id: {0}")]
    InvalidUploadId(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Missing chunk {index} of {total}")]
    MissingChunk { index: u32, total: u32 },
}
