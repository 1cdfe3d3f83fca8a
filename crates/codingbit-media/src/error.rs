use codingbit_storage::StorageError;

/// Errors from the single transcode attempt.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transcoder failed: {stderr}")]
    Failed { stderr: String },

    #[error("transcode did not finish within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Errors from the upload pipeline, keyed by the phase that failed so the
/// HTTP layer can classify them.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("staging failed: {0}")]
    Staging(#[source] StorageError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("publish failed: {0}")]
    Publish(#[source] StorageError),
}
