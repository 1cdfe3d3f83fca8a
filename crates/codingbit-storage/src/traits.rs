use async_trait::async_trait;
use codingbit_core::StorageBackend;

/// Storage operation errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to upload object: {0}")]
    UploadFailed(String),

    #[error("Failed to download object: {0}")]
    DownloadFailed(String),

    #[error("Failed to delete object: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Object store abstraction for published media.
///
/// Implementations must be Send + Sync to be shared across async tasks.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write an object to the store. Returns the object's public URL once
    /// the backend has acknowledged the write as durable. Writing to an
    /// existing key overwrites it.
    async fn publish(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> StorageResult<String>;

    /// Grant public read access to an object. Callers must only invoke this
    /// after `publish` has returned for the same key.
    async fn make_public(&self, key: &str) -> StorageResult<()>;

    /// Download an object's bytes.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object. Deleting a nonexistent object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// The public URL an object will be served from, derived from the
    /// backend's base URL, the bucket and the key.
    fn public_url(&self, key: &str) -> String;

    /// Backend type identifier
    fn backend_type(&self) -> StorageBackend;
}
