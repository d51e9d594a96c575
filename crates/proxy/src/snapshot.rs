//! Persisted catalog snapshot.
//!
//! The snapshot is a single pretty-printed JSON file holding the complete
//! product list from the last successful sync. Writers are serialized by an
//! async mutex and publish by renaming a fully written sibling file over the
//! target, so readers never take the lock and never see a partial file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use catalog_cache_core::Product;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Errors reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No sync has been persisted yet.
    #[error("No snapshot at {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but is not a product list.
    #[error("Snapshot {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Any other filesystem failure.
    #[error("Snapshot I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The product list could not be encoded.
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl SnapshotError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File-backed store for the catalog snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot with `products`.
    ///
    /// The list is written to a uniquely named sibling file, flushed to disk,
    /// and renamed over the snapshot. The parent directory is created if
    /// needed. On failure the previous snapshot is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Io` if any filesystem step fails.
    #[instrument(skip(self, products), fields(path = %self.path.display(), count = products.len()))]
    pub async fn write(&self, products: &[Product]) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(products).map_err(SnapshotError::Encode)?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SnapshotError::io(parent, e))?;
        }

        let temp = self.temp_path();
        if let Err(e) = write_synced(&temp, &json).await {
            discard(&temp).await;
            return Err(SnapshotError::io(&temp, e));
        }

        if let Err(e) = fs::rename(&temp, &self.path).await {
            discard(&temp).await;
            return Err(SnapshotError::io(&self.path, e));
        }

        debug!(bytes = json.len(), "Snapshot written");
        Ok(())
    }

    /// Load the current snapshot.
    ///
    /// # Errors
    ///
    /// - `SnapshotError::NotFound` if nothing has been written yet
    /// - `SnapshotError::Corrupt` if the file is not a product list
    /// - `SnapshotError::Io` for any other filesystem failure
    pub async fn read(&self) -> Result<Vec<Product>, SnapshotError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(SnapshotError::io(&self.path, e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "snapshot".into(), |n| n.to_string_lossy());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }
}

async fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

async fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %temp.display(), error = %e, "Failed to remove temporary snapshot file");
    }
}
