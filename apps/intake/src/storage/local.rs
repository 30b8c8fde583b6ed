use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{CvStorage, StorageError, UploadedCv};

/// Stores CVs on the local filesystem under `root`.
/// The returned address is the file path.
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl CvStorage for LocalDiskStorage {
    async fn put(&self, key: &str, cv: &UploadedCv) -> Result<String, StorageError> {
        let path = self.root.join(key);
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        // create_new: never clobber an existing upload
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        let written = match file.write_all(&cv.bytes).await {
            Ok(()) => file.sync_all().await,
            Err(e) => Err(e),
        };
        discard_on_error(&path, written).await.map_err(io_err)?;

        debug!("Wrote {} bytes to {}", cv.bytes.len(), path.display());
        Ok(path.display().to_string())
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

/// Removes a file whose write failed part-way, then hands back the original error.
async fn discard_on_error<T>(path: &Path, result: io::Result<T>) -> io::Result<T> {
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Could not remove partial upload {}: {e}", path.display());
        }
    }
    result
}
