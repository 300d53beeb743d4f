//! Keepsake Storage Layer
//!
//! This crate provides the upload storage abstraction for Keepsake:
//! one-shot file writes, naive sequential chunk assembly, and read-back
//! for serving stored files.

pub mod backend;
pub mod error;
pub mod local;

pub use backend::{ByteStream, StoredFile, UploadKind, UploadStore};
pub use error::StorageError;
pub use local::LocalStorage;
