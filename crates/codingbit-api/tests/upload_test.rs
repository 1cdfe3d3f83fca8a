//! Video upload integration tests.
//!
//! Run with: `cargo test -p codingbit-api --test upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use codingbit_media::FfmpegTranscoder;
use helpers::{setup_test_app, setup_test_app_with};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

fn video_form(data: &[u8]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::copy_from_slice(data))
        .file_name("clip.mov")
        .mime_type("video/quicktime");
    MultipartForm::new().add_part("video", part)
}

#[tokio::test]
async fn upload_returns_public_url_and_cleans_staging() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/upload")
        .multipart(video_form(b"fake video bytes"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Upload successful");
    let url = body["url"].as_str().expect("url in response");
    assert!(url.starts_with("http://localhost:4000/media/coding-bit/"));
    assert!(url.contains("anonymous-"));
    assert!(url.ends_with(".mov"));

    // Every terminal state leaves the staging area empty.
    assert_eq!(app.staged_count(), 0);

    // The published object is on disk under the prefix, with the uploaded
    // bytes (the test transcoder copies its input).
    let key = url
        .strip_prefix("http://localhost:4000/media/")
        .expect("url uses the local base");
    let stored = app.store_dir.join(key);
    assert_eq!(std::fs::read(stored).expect("published object"), b"fake video bytes");
}

#[tokio::test]
async fn upload_without_video_field_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("note", "no file here");
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "NO_FILE");
    assert_eq!(body["error"], "No file uploaded.");
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn missing_encoder_returns_diagnostic_and_cleans_staging() {
    let transcoder = Arc::new(
        FfmpegTranscoder::new(
            "/nonexistent/ffmpeg-missing".to_string(),
            Duration::from_secs(5),
        )
        .expect("build transcoder"),
    );
    let app = setup_test_app_with(transcoder).await;

    let response = app
        .server
        .post("/upload")
        .multipart(video_form(b"bytes"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "TRANSCODE_ERROR");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("ffmpeg-missing"));
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn upload_with_invalid_token_is_unauthorized() {
    let app = setup_test_app().await;

    let form = video_form(b"bytes").add_text("token", "not-a-jwt");
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["code"], "INVALID_TOKEN");
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn token_without_an_account_behind_it_is_rejected() {
    let app = setup_test_app().await;
    let token = app.unregistered_token_for("ghost@example.com");

    let form = video_form(b"bytes").add_text("token", token);
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn upload_with_token_namespaces_object_by_email() {
    let app = setup_test_app().await;
    let token = app.token_for("alice@example.com").await;

    let form = video_form(b"bytes").add_text("token", token);
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let url = body["url"].as_str().expect("url in response");
    assert!(url.contains("/coding-bit/alice-"));
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn bearer_header_works_like_token_field() {
    let app = setup_test_app().await;
    let token = app.token_for("bob@example.com").await;

    let response = app
        .server
        .post("/upload")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(video_form(b"bytes"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["url"]
        .as_str()
        .expect("url in response")
        .contains("/coding-bit/bob-"));
}

#[tokio::test]
async fn same_filename_uploads_get_distinct_urls() {
    let app = setup_test_app().await;

    let first = app
        .server
        .post("/upload")
        .multipart(video_form(b"one"))
        .await;
    let second = app
        .server
        .post("/upload")
        .multipart(video_form(b"two"))
        .await;

    assert_eq!(first.status_code(), 200);
    assert_eq!(second.status_code(), 200);
    let first_url = first.json::<Value>()["url"]
        .as_str()
        .expect("first url")
        .to_string();
    let second_url = second.json::<Value>()["url"]
        .as_str()
        .expect("second url")
        .to_string();
    assert_ne!(first_url, second_url);
}

#[tokio::test]
async fn disallowed_extension_is_rejected() {
    let app = setup_test_app().await;

    let part = Part::bytes(bytes::Bytes::from_static(b"x"))
        .file_name("malware.exe")
        .mime_type("video/mp4");
    let form = MultipartForm::new().add_part("video", part);
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn disallowed_content_type_is_rejected() {
    let app = setup_test_app().await;

    let part = Part::bytes(bytes::Bytes::from_static(b"<html>"))
        .file_name("clip.mov")
        .mime_type("text/html");
    let form = MultipartForm::new().add_part("video", part);
    let response = app.server.post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let app = setup_test_app().await;

    let response = app.server.post("/upload").multipart(video_form(b"")).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    assert_eq!(app.staged_count(), 0);
}

#[tokio::test]
async fn health_reports_storage_and_database() {
    let app = setup_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "not_configured");
    assert_eq!(body["storage"], "ok");
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let app = setup_test_app().await;

    let response = app.server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"].get("/upload").is_some());
    assert!(body["paths"].get("/users/signup").is_some());
}
