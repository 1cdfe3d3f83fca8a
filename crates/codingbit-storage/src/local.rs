use async_trait::async_trait;
use codingbit_core::StorageBackend;
use std::path::PathBuf;
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// Filesystem-backed object storage.
///
/// Objects live under a root directory and are addressed by their key
/// relative to that root. Public URLs are derived from a configured base
/// URL, assuming the root is exposed by a static file server.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "failed to create storage root '{}': {}",
                root.display(),
                e
            ))
        })?;

        let root = root.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!(
                "failed to canonicalize storage root '{}': {}",
                root.display(),
                e
            ))
        })?;

        info!(root = %root.display(), "Initialized local storage");

        Ok(LocalStorage { root, base_url })
    }

    /// Map a storage key to a path under the root, rejecting keys that
    /// could escape it.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key must not be empty".to_string()));
        }
        if key.starts_with('/') || key.contains("..") || key.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "key '{}' must be a relative path without traversal",
                key
            )));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent_dir(&self, path: &PathBuf) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn publish(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let start = Instant::now();
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let size_bytes = data.len();

        // Existing objects are overwritten in place.
        let mut file = fs::File::create(&path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        info!(
            key = %key,
            content_type = %content_type,
            size_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Published object to local storage"
        );

        Ok(self.public_url(key))
    }

    async fn make_public(&self, key: &str) -> StorageResult<()> {
        // Everything under the serving root is already world readable, so
        // this only validates the key.
        self.key_to_path(key)?;
        debug!(key = %key, "Local objects are public by default");
        Ok(())
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await?;
        debug!(key = %key, size_bytes = data.len(), "Read object from local storage");
        Ok(data)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        // Deleting an absent object is a successful no-op.
        if !fs::try_exists(&path).await? {
            return Ok(());
        }

        fs::remove_file(&path).await?;
        debug!(key = %key, "Deleted object from local storage");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
