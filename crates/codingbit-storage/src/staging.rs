use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Handle to a transient file owned by a single upload run.
///
/// Holders are responsible for releasing the file on every exit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
}

impl StagedFile {
    pub fn new(path: PathBuf) -> Self {
        StagedFile { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Transient scratch area for files that only exist while an upload is in
/// flight.
#[async_trait]
pub trait Staging: Send + Sync {
    /// Write bytes to a fresh file derived from `name`. Staging the same
    /// name twice yields two distinct files.
    async fn stage(&self, data: &[u8], name: &str) -> StorageResult<StagedFile>;

    /// Allocate a fresh path derived from `name` without creating the file,
    /// for a producer that writes it later.
    async fn reserve(&self, name: &str) -> StorageResult<StagedFile>;

    /// Read a staged file back into memory.
    async fn read(&self, file: &StagedFile) -> StorageResult<Vec<u8>>;

    /// Remove a staged file. Releasing a file that is already gone is a
    /// no-op; failures are logged and swallowed so cleanup never masks the
    /// error that caused it.
    async fn release(&self, file: &StagedFile);
}

/// Staging area backed by a directory on the local disk.
pub struct DiskStaging {
    dir: PathBuf,
}

impl DiskStaging {
    pub async fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();

        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "failed to create staging directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        Ok(DiskStaging { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a unique single-component filename under the staging root.
    /// The uuid prefix keeps concurrent requests with identical inputs
    /// from colliding.
    fn unique_path(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty() {
            return Err(StorageError::InvalidKey(
                "staging name must not be empty".to_string(),
            ));
        }
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(StorageError::InvalidKey(format!(
                "staging name '{}' must be a plain filename",
                name
            )));
        }
        Ok(self
            .dir
            .join(format!("{}__{}", Uuid::new_v4().simple(), name)))
    }
}

#[async_trait]
impl Staging for DiskStaging {
    async fn stage(&self, data: &[u8], name: &str) -> StorageResult<StagedFile> {
        let path = self.unique_path(name)?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        debug!(path = %path.display(), size_bytes = data.len(), "Staged file");
        Ok(StagedFile::new(path))
    }

    async fn reserve(&self, name: &str) -> StorageResult<StagedFile> {
        let path = self.unique_path(name)?;
        debug!(path = %path.display(), "Reserved staging path");
        Ok(StagedFile::new(path))
    }

    async fn read(&self, file: &StagedFile) -> StorageResult<Vec<u8>> {
        let data = fs::read(&file.path).await?;
        Ok(data)
    }

    async fn release(&self, file: &StagedFile) {
        match fs::remove_file(&file.path).await {
            Ok(()) => debug!(path = %file.path.display(), "Released staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to release staged file")
            }
        }
    }
}
