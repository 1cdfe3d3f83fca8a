use codingbit_core::models::PublishedAsset;
use codingbit_storage::{ObjectStorage, StagedFile, Staging};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::error::PipelineError;
use crate::profile::TranscodeProfile;
use crate::transcoder::Transcoder;

/// Best-effort removal of a staged path if the owning future is dropped
/// before the explicit release runs, e.g. when the client disconnects.
struct ReleaseGuard {
    path: Option<PathBuf>,
}

impl ReleaseGuard {
    fn new(path: PathBuf) -> Self {
        ReleaseGuard { path: Some(path) }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Drives one upload from buffered bytes to a public object.
///
/// Stages the input, transcodes it, publishes the result under the
/// configured key prefix and grants public access. Staged files are
/// released on success and on every failure path.
pub struct VideoPipeline {
    staging: Arc<dyn Staging>,
    transcoder: Arc<dyn Transcoder>,
    storage: Arc<dyn ObjectStorage>,
    profile: TranscodeProfile,
    prefix: String,
}

impl VideoPipeline {
    pub fn new(
        staging: Arc<dyn Staging>,
        transcoder: Arc<dyn Transcoder>,
        storage: Arc<dyn ObjectStorage>,
        profile: TranscodeProfile,
        prefix: impl Into<String>,
    ) -> Self {
        VideoPipeline {
            staging,
            transcoder,
            storage,
            profile,
            prefix: prefix.into(),
        }
    }

    /// Process one upload. `source_name` names the incoming file inside the
    /// staging area, `dest_name` becomes the object's filename under the
    /// pipeline prefix.
    pub async fn process(
        &self,
        data: &[u8],
        source_name: &str,
        dest_name: &str,
        content_type: &str,
    ) -> Result<PublishedAsset, PipelineError> {
        let input = self
            .staging
            .stage(data, source_name)
            .await
            .map_err(PipelineError::Staging)?;
        let mut input_guard = ReleaseGuard::new(input.path.clone());

        let output = match self.staging.reserve(dest_name).await {
            Ok(file) => file,
            Err(e) => {
                self.staging.release(&input).await;
                input_guard.disarm();
                return Err(PipelineError::Staging(e));
            }
        };
        let mut output_guard = ReleaseGuard::new(output.path.clone());

        let result = self.run(&input, &output, dest_name, content_type).await;

        // Terminal state reached. Staged files go away whether the run
        // succeeded or not.
        self.staging.release(&input).await;
        self.staging.release(&output).await;
        input_guard.disarm();
        output_guard.disarm();

        result
    }

    async fn run(
        &self,
        input: &StagedFile,
        output: &StagedFile,
        dest_name: &str,
        content_type: &str,
    ) -> Result<PublishedAsset, PipelineError> {
        info!(input = %input.path.display(), "Transcoding upload");
        self.transcoder
            .transcode(input.path(), output.path(), &self.profile)
            .await?;

        let transcoded = self
            .staging
            .read(output)
            .await
            .map_err(PipelineError::Staging)?;

        let key = self.object_key(dest_name);
        info!(key = %key, size_bytes = transcoded.len(), "Publishing transcoded video");
        let url = self
            .storage
            .publish(&key, transcoded, content_type)
            .await
            .map_err(PipelineError::Publish)?;

        // Only flips visibility once publish has confirmed the object
        // durable.
        self.storage
            .make_public(&key)
            .await
            .map_err(PipelineError::Publish)?;

        info!(key = %key, url = %url, "Upload published");
        Ok(PublishedAsset {
            key,
            url,
            content_type: content_type.to_string(),
        })
    }

    fn object_key(&self, dest_name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            dest_name.to_string()
        } else {
            format!("{}/{}", prefix, dest_name)
        }
    }
}
