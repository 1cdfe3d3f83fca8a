//! Video upload endpoint.

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use codingbit_core::models::{email_namespace, UploadResponse};
use codingbit_core::AppError;
use std::sync::Arc;
use tracing::info;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{
    derive_object_name, extract_video_upload, sanitize_filename, sanitize_namespace,
    validate_content_type, validate_file_extension, validate_file_size,
};

/// Upload a video, transcode it and publish it to object storage.
///
/// The session token may arrive either as a `token` form field or as an
/// `Authorization: Bearer` header. Authenticated uploads are namespaced by
/// the part of the uploader's email before the at-sign.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video transcoded and published", body = UploadResponse),
        (status = 400, description = "No video field or invalid file", body = ErrorResponse),
        (status = 401, description = "Invalid session token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Transcode or object store failure", body = ErrorResponse),
    ),
    tag = "videos"
)]
#[tracing::instrument(skip_all)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = extract_video_upload(multipart).await?;

    let token = upload.token.clone().or_else(|| bearer_token(&headers));
    let namespace = match token {
        Some(token) => {
            let claims = state.jwt.verify(&token)?;
            // The token may outlive the account; re-check before namespacing.
            state
                .users
                .find_by_email(&claims.email)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
            sanitize_namespace(email_namespace(&claims.email))
        }
        None if state.config.upload_require_auth => {
            return Err(AppError::Unauthorized(
                "A session token is required to upload".to_string(),
            )
            .into());
        }
        None => "anonymous".to_string(),
    };

    if upload.data.is_empty() {
        return Err(AppError::InvalidInput("Uploaded video is empty".to_string()).into());
    }
    validate_file_size(upload.data.len(), state.config.max_video_size_bytes)?;
    validate_content_type(
        &upload.content_type,
        &state.config.video_allowed_content_types,
    )?;
    let filename = sanitize_filename(&upload.filename)?;
    let extension = validate_file_extension(&filename, &state.config.video_allowed_extensions)?;

    let object_name = derive_object_name(&namespace, &extension, Utc::now().timestamp_millis());

    info!(
        namespace = %namespace,
        filename = %filename,
        size_bytes = upload.data.len(),
        object_name = %object_name,
        "Processing video upload"
    );

    let asset = state
        .pipeline
        .process(&upload.data, &filename, &object_name, &upload.content_type)
        .await?;

    Ok(Json(UploadResponse::new(&asset)))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parses_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_empty_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
