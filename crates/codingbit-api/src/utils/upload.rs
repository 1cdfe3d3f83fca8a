//! Common utilities for the video upload handler.

use axum::extract::Multipart;
use codingbit_core::AppError;
use uuid::Uuid;

/// One parsed multipart upload: the video bytes, the client-supplied filename
/// and content type, and the optional session token field.
pub struct VideoUpload {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub token: Option<String>,
}

/// Extract the video file and the optional token from a multipart form.
/// Exactly one field named "video" is accepted; a form without one means the
/// caller sent no file at all.
pub async fn extract_video_upload(mut multipart: Multipart) -> Result<VideoUpload, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut token: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "video" => {
                if file_data.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple video fields are not allowed; send exactly one field named 'video'"
                            .to_string(),
                    ));
                }
                filename = field.file_name().map(|s: &str| s.to_string());
                content_type = field.content_type().map(|s: &str| s.to_string());

                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
            }
            "token" => {
                let value = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read token field: {}", e))
                })?;
                token = Some(value);
            }
            _ => {}
        }
    }

    let data = file_data.ok_or(AppError::MissingFile)?;

    Ok(VideoUpload {
        data,
        filename: filename.unwrap_or_else(|| "unknown".to_string()),
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        token: token.filter(|t| !t.is_empty()),
    })
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate content type against the allowlist. Compares the normalized MIME
/// type only (no parameter bypass).
pub fn validate_content_type(content_type: &str, allowed_types: &[String]) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }
    Ok(())
}

/// Validate the file extension and return it lowercased.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, AppError> {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    if !allowed_extensions.contains(&extension) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file extension. Allowed extensions: {}",
            allowed_extensions.join(", ")
        )));
    }

    Ok(extension)
}

/// Sanitize filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    const MAX_FILENAME_LENGTH: usize = 255;

    if filename.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// Namespaces end up inside object names, so restrict them to filename-safe
/// characters.
pub fn sanitize_namespace(namespace: &str) -> String {
    let cleaned: String = namespace
        .chars()
        .take(64)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

/// Derive the published object's filename. The millisecond timestamp plus a
/// short random suffix keeps names unique even when two uploads land in the
/// same millisecond.
pub fn derive_object_name(namespace: &str, extension: &str, timestamp_millis: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.{}",
        namespace,
        timestamp_millis,
        &suffix[..8],
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_filename_accepts_valid_names() {
        assert_eq!(sanitize_filename("clip.mov").unwrap(), "clip.mov");
        assert_eq!(sanitize_filename("my-video_1.mp4").unwrap(), "my-video_1.mp4");
    }

    #[test]
    fn sanitize_filename_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("dir/clip.mov").unwrap(), "clip.mov");
        assert_eq!(sanitize_filename("my clip!.mov").unwrap(), "my_clip_.mov");
    }

    #[test]
    fn sanitize_namespace_maps_unsafe_characters() {
        assert_eq!(sanitize_namespace("alice"), "alice");
        assert_eq!(sanitize_namespace("a.b+tag"), "a.b_tag");
        assert_eq!(sanitize_namespace(""), "anonymous");
    }

    #[test]
    fn validate_file_extension_is_case_insensitive() {
        let allowed = vec!["mov".to_string(), "mp4".to_string()];
        assert_eq!(validate_file_extension("clip.MOV", &allowed).unwrap(), "mov");
        assert!(validate_file_extension("clip.exe", &allowed).is_err());
        assert!(validate_file_extension("noextension", &allowed).is_err());
    }

    #[test]
    fn validate_content_type_ignores_parameters() {
        let allowed = vec!["video/mp4".to_string()];
        assert!(validate_content_type("video/mp4; codecs=avc1", &allowed).is_ok());
        assert!(validate_content_type("text/html", &allowed).is_err());
    }

    #[test]
    fn validate_file_size_enforces_limit() {
        assert!(validate_file_size(10, 10).is_ok());
        assert!(validate_file_size(11, 10).is_err());
    }

    /// Object names must stay unique even when the clock does not move
    /// between uploads.
    #[test]
    fn derive_object_name_is_unique_under_equal_timestamps() {
        let fixed_millis = 1_700_000_000_000;
        let names: HashSet<String> = (0..100)
            .map(|_| derive_object_name("alice", "mov", fixed_millis))
            .collect();
        assert_eq!(names.len(), 100);
        for name in &names {
            assert!(name.starts_with("alice-1700000000000-"));
            assert!(name.ends_with(".mov"));
        }
    }
}
