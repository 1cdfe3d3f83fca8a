//! Video ingestion: transcode profile, ffmpeg invocation and the upload
//! pipeline that ties staging, transcoding and publishing together.

pub mod error;
pub mod pipeline;
pub mod profile;
pub mod transcoder;

pub use error::{PipelineError, TranscodeError};
pub use pipeline::VideoPipeline;
pub use profile::TranscodeProfile;
pub use transcoder::{FfmpegTranscoder, Transcoder};
