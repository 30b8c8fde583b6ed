//! CV storage: pluggable, trait-based backends that durably store an uploaded
//! file and hand back the address it can be retrieved from.
//!
//! `LocalDiskStorage` writes under a directory and returns the file path.
//! `S3Storage` uploads to an S3-compatible bucket and returns a public URL.
//! `AppState` holds an `Arc<dyn CvStorage>`, chosen at startup from `StorageConfig`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

pub mod local;
pub mod s3;

pub use local::LocalDiskStorage;
pub use s3::S3Storage;

/// Folder (or key prefix) every CV is stored under.
pub const CV_FOLDER: &str = "cv_uploads";
const DEFAULT_EXTENSION: &str = "pdf";
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote upload failed: {0}")]
    Remote(String),

    #[error("storage write timed out after {0:?}")]
    Timeout(Duration),
}

/// A CV file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedCv {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedCv {
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Extension of the uploaded file name when it is short and alphanumeric,
    /// otherwise `pdf`.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8)
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }
}

/// The storage backend trait. Implement this to add a backend without touching
/// the intake workflow or handlers.
#[async_trait]
pub trait CvStorage: Send + Sync {
    /// Durably stores `cv` under `key` and returns its retrieval address.
    async fn put(&self, key: &str, cv: &UploadedCv) -> Result<String, StorageError>;

    /// Short backend name for logs ("local" | "s3").
    fn backend(&self) -> &'static str;
}

/// Generates a collision-free key: `cv_uploads/cv_<unix-millis>_<uuid>.<ext>`.
/// The time prefix keeps keys sortable; the uuid separates same-millisecond uploads.
pub fn object_key(cv: &UploadedCv) -> String {
    format!(
        "{CV_FOLDER}/cv_{}_{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        cv.extension()
    )
}

/// Builds the backend selected by configuration.
pub async fn build_storage(config: &StorageConfig) -> Arc<dyn CvStorage> {
    match config {
        StorageConfig::Local { root } => Arc::new(LocalDiskStorage::new(root.clone())),
        StorageConfig::S3(s3_config) => Arc::new(S3Storage::from_config(s3_config).await),
    }
}
