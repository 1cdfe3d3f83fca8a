use std::sync::Arc;

use codingbit_core::{Config, StorageBackend};

use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// Create the object storage backend selected by the configuration.
///
/// Defaults to S3 when STORAGE_BACKEND is unset, matching the validation
/// in [`Config::validate`].
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn ObjectStorage>> {
    let backend = config.storage_backend.unwrap_or(StorageBackend::S3);

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config.s3_bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_BUCKET must be set for the s3 backend".to_string())
            })?;
            let region = config
                .s3_region
                .clone()
                .or_else(|| config.aws_region.clone())
                .ok_or_else(|| {
                    StorageError::ConfigError(
                        "S3_REGION or AWS_REGION must be set for the s3 backend".to_string(),
                    )
                })?;

            let storage =
                crate::s3::S3Storage::new(bucket, region, config.s3_endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let root = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "LOCAL_STORAGE_PATH must be set for the local backend".to_string(),
                )
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "LOCAL_STORAGE_BASE_URL must be set for the local backend".to_string(),
                )
            })?;

            let storage = crate::local::LocalStorage::new(root, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "binary was built without the storage-s3 feature".to_string(),
        )),

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "binary was built without the storage-local feature".to_string(),
        )),
    }
}
