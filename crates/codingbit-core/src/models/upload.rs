use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A transcoded object that reached durable storage and was made public.
/// Immutable once created; outlives the request that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishedAsset {
    /// Object key within the bucket, including the folder prefix.
    pub key: String,
    /// Stable public URL; base URL + bucket + key, no signing, no expiry.
    pub url: String,
    pub content_type: String,
}

/// Response body for a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

impl UploadResponse {
    pub fn new(asset: &PublishedAsset) -> Self {
        UploadResponse {
            message: "Upload successful".to_string(),
            url: asset.url.clone(),
        }
    }
}
