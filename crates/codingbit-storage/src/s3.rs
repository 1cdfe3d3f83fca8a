use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use codingbit_core::StorageBackend;
use std::time::Instant;
use tracing::{debug, info};

use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// S3-compatible object storage backend.
///
/// Works against AWS S3 as well as S3-compatible services (MinIO,
/// DigitalOcean Spaces) via a custom endpoint URL.
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3Storage {
    pub async fn new(
        bucket: String,
        region: String,
        endpoint: Option<String>,
    ) -> StorageResult<Self> {
        if bucket.is_empty() {
            return Err(StorageError::ConfigError(
                "S3 bucket name must not be empty".to_string(),
            ));
        }

        let region_provider = RegionProviderChain::first_try(Region::new(region.clone()))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        let client = match &endpoint {
            Some(endpoint_url) => {
                // Path-style addressing is required by most S3-compatible
                // services behind a custom endpoint.
                let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
                    .endpoint_url(endpoint_url)
                    .force_path_style(true)
                    .build();
                Client::from_conf(s3_config)
            }
            None => Client::new(&shared_config),
        };

        info!(bucket = %bucket, region = %region, endpoint = ?endpoint, "Initialized S3 storage");

        Ok(S3Storage {
            client,
            bucket,
            region,
            endpoint,
        })
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn publish(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let start = Instant::now();
        let size_bytes = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(data)))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("put_object failed for key '{}': {}", key, e))
            })?;

        info!(
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Published object to S3"
        );

        Ok(self.public_url(key))
    }

    async fn make_public(&self, key: &str) -> StorageResult<()> {
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "put_object_acl failed for key '{}': {}",
                    key, e
                ))
            })?;

        debug!(key = %key, "Granted public read access");
        Ok(())
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
                {
                    StorageError::NotFound(key.to_string())
                }
                _ => StorageError::DownloadFailed(format!(
                    "get_object failed for key '{}': {}",
                    key, e
                )),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                StorageError::DownloadFailed(format!(
                    "failed to read body for key '{}': {}",
                    key, e
                ))
            })?
            .into_bytes()
            .to_vec();

        debug!(key = %key, size_bytes = data.len(), "Downloaded object from S3");
        Ok(data)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        // S3 delete_object succeeds for absent keys, so this is idempotent.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StorageError::DeleteFailed(format!(
                    "delete_object failed for key '{}': {}",
                    key, e
                ))
            })?;

        debug!(key = %key, "Deleted object from S3");
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Ok(false)
            }
            Err(e) => Err(StorageError::BackendError(format!(
                "head_object failed for key '{}': {}",
                key, e
            ))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
