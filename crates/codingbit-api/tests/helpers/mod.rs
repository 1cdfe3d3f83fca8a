//! Test helpers: build the app against local storage, disk staging and an
//! in-memory user store, so tests need no database and no ffmpeg binary.
//!
//! Run from the workspace root: `cargo test -p codingbit-api`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use codingbit_api::auth::JwtService;
use codingbit_api::setup::routes;
use codingbit_api::state::AppState;
use codingbit_core::models::User;
use codingbit_core::{AppError, Config, StorageBackend};
use codingbit_db::UserStore;
use codingbit_media::{TranscodeError, TranscodeProfile, Transcoder, VideoPipeline};
use codingbit_storage::{DiskStaging, LocalStorage, ObjectStorage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

/// User store backed by a HashMap, mirroring the repository's semantics.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn create(
        &self,
        email: &str,
        nickname: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            nickname: nickname.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        for user in users.values_mut() {
            if user.id == user_id {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                return Ok(());
            }
        }
        Err(AppError::NotFound("User not found".to_string()))
    }
}

/// Transcoder that copies the input file to the output path, standing in for
/// ffmpeg.
pub struct CopyTranscoder;

#[async_trait]
impl Transcoder for CopyTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _profile: &TranscodeProfile,
    ) -> Result<(), TranscodeError> {
        tokio::fs::copy(input, output)
            .await
            .map_err(|e| TranscodeError::Spawn {
                command: "copy".to_string(),
                source: e,
            })?;
        Ok(())
    }
}

/// Test application: server plus the directories and handles tests assert on.
pub struct TestApp {
    pub server: TestServer,
    pub staging_dir: PathBuf,
    pub store_dir: PathBuf,
    pub users: Arc<MemoryUserStore>,
    pub jwt: JwtService,
    pub jwt_secret: String,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Number of files currently in the staging directory.
    pub fn staged_count(&self) -> usize {
        std::fs::read_dir(&self.staging_dir)
            .expect("read staging dir")
            .count()
    }

    /// Register an account and mint a session token for it.
    pub async fn token_for(&self, email: &str) -> String {
        let user = self
            .users
            .create(email, "tester", "not-a-real-hash")
            .await
            .expect("create user");
        self.jwt.issue(&user).expect("issue token")
    }

    /// Mint a well-formed session token with no account behind it.
    pub fn unregistered_token_for(&self, email: &str) -> String {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            nickname: "tester".to_string(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.jwt.issue(&user).expect("issue token")
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(CopyTranscoder)).await
}

/// Setup the app with a caller-provided transcoder, for tests that exercise
/// encoder failures.
pub async fn setup_test_app_with(transcoder: Arc<dyn Transcoder>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let staging_dir = temp_dir.path().join("staging");
    let store_dir = temp_dir.path().join("store");

    let config = test_config(&staging_dir);

    let storage: Arc<dyn ObjectStorage> = Arc::new(
        LocalStorage::new(store_dir.clone(), "http://localhost:4000/media".to_string())
            .await
            .expect("create local storage"),
    );
    let store_dir = store_dir.canonicalize().expect("canonicalize store dir");

    let staging = Arc::new(
        DiskStaging::new(staging_dir.clone())
            .await
            .expect("create staging dir"),
    );

    let pipeline = Arc::new(VideoPipeline::new(
        staging,
        transcoder,
        storage.clone(),
        TranscodeProfile::from_config(&config),
        config.upload_prefix.clone(),
    ));

    let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiry_hours);
    let jwt_secret = config.jwt_secret.clone();
    let users = Arc::new(MemoryUserStore::default());

    let state = Arc::new(AppState {
        jwt: jwt.clone(),
        users: users.clone(),
        db_pool: None,
        email: None,
        storage,
        pipeline,
        config,
    });

    let app = routes::setup_routes(&state.config, state.clone()).expect("setup routes");
    let server = TestServer::new(app.into_make_service()).expect("create test server");

    TestApp {
        server,
        staging_dir,
        store_dir,
        users,
        jwt,
        jwt_secret,
        _temp_dir: temp_dir,
    }
}

fn test_config(staging_dir: &Path) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        database_url: "postgresql://localhost/unused".to_string(),
        db_max_connections: 5,
        db_timeout_seconds: 30,
        jwt_secret: "test-secret-key-min-32-characters-long!!".to_string(),
        jwt_expiry_hours: 24,
        password_reset_ttl_minutes: 30,
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: None,
        local_storage_base_url: None,
        upload_prefix: "coding-bit".to_string(),
        upload_require_auth: false,
        staging_dir: staging_dir.to_path_buf(),
        max_video_size_bytes: 10 * 1024 * 1024,
        video_allowed_extensions: vec!["mp4".to_string(), "mov".to_string()],
        video_allowed_content_types: vec![
            "video/mp4".to_string(),
            "video/quicktime".to_string(),
        ],
        ffmpeg_path: "ffmpeg".to_string(),
        transcode_timeout_secs: 60,
        video_codec: "libx264".to_string(),
        audio_codec: "aac".to_string(),
        video_width: 1280,
        video_height: 720,
        video_crf: 28,
        audio_bitrate_kbps: 128,
        ffmpeg_preset: "veryfast".to_string(),
        smtp_host: None,
        smtp_port: None,
        smtp_user: None,
        smtp_password: None,
        smtp_from: None,
        smtp_tls: true,
        frontend_url: None,
    }
}
