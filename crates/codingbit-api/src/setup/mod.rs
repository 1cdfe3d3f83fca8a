//! Application setup: telemetry, database, storage, services and routes.

pub mod database;
pub mod routes;
pub mod server;

use anyhow::Context;
use codingbit_core::Config;
use codingbit_db::UserRepository;
use codingbit_media::{FfmpegTranscoder, TranscodeProfile, VideoPipeline};
use codingbit_storage::{create_storage, DiskStaging};
use std::sync::Arc;
use tracing::info;

use crate::auth::JwtService;
use crate::services::EmailService;
use crate::state::AppState;

/// Wire up every dependency and return the shared state plus the router.
pub async fn initialize_app(
    config: Config,
) -> Result<(Arc<AppState>, axum::Router), anyhow::Error> {
    crate::telemetry::init_telemetry();

    info!(environment = %config.environment, "Starting codingbit API");

    let pool = database::setup_database(&config).await?;

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize object storage")?;
    info!(backend = ?storage.backend_type(), "Object storage initialized");

    let staging = Arc::new(
        DiskStaging::new(config.staging_dir.clone())
            .await
            .context("Failed to initialize staging directory")?,
    );

    let transcoder = Arc::new(FfmpegTranscoder::from_config(&config)?);
    let pipeline = Arc::new(VideoPipeline::new(
        staging,
        transcoder,
        storage.clone(),
        TranscodeProfile::from_config(&config),
        config.upload_prefix.clone(),
    ));

    let email = EmailService::from_config(&config);
    if email.is_none() {
        info!("SMTP not configured; password reset emails disabled");
    }

    let state = Arc::new(AppState {
        jwt: JwtService::new(&config.jwt_secret, config.jwt_expiry_hours),
        users: Arc::new(UserRepository::new(pool.clone())),
        db_pool: Some(pool),
        email,
        storage,
        pipeline,
        config,
    });

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
