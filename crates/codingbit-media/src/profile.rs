use codingbit_core::Config;
use std::path::Path;

/// Output settings for the single transcode pass applied to every upload.
#[derive(Debug, Clone)]
pub struct TranscodeProfile {
    pub video_codec: String,
    pub audio_codec: String,
    pub width: u32,
    pub height: u32,
    pub crf: u8,
    pub audio_bitrate_kbps: u32,
    pub preset: String,
}

impl Default for TranscodeProfile {
    fn default() -> Self {
        TranscodeProfile {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            width: 1280,
            height: 720,
            crf: 28,
            audio_bitrate_kbps: 128,
            preset: "veryfast".to_string(),
        }
    }
}

impl TranscodeProfile {
    pub fn from_config(config: &Config) -> Self {
        TranscodeProfile {
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
            width: config.video_width,
            height: config.video_height,
            crf: config.video_crf,
            audio_bitrate_kbps: config.audio_bitrate_kbps,
            preset: config.ffmpeg_preset.clone(),
        }
    }

    /// Build the ffmpeg argument list for transcoding `input` into `output`.
    /// The container format is inferred from the output file's extension.
    pub fn ffmpeg_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec!["-i".to_string(), input.to_string_lossy().to_string()];

        args.extend_from_slice(&[
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-vf".to_string(),
            format!("scale={}:{}", self.width, self.height),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            format!("{}k", self.audio_bitrate_kbps),
            "-y".to_string(),
        ]);

        args.push(output.to_string_lossy().to_string());
        args
    }
}
