//! Application state shared across handlers.
//!
//! One struct is enough at this size; handlers receive it as
//! `State<Arc<AppState>>`.

use codingbit_core::Config;
use codingbit_db::UserStore;
use codingbit_media::VideoPipeline;
use codingbit_storage::ObjectStorage;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::services::EmailService;

pub struct AppState {
    pub config: Config,
    /// None when running without a database, e.g. in tests. The health
    /// endpoint then reports the database as not configured.
    pub db_pool: Option<PgPool>,
    pub users: Arc<dyn UserStore>,
    pub jwt: JwtService,
    /// None when SMTP is not configured; password reset emails are skipped.
    pub email: Option<EmailService>,
    pub storage: Arc<dyn ObjectStorage>,
    pub pipeline: Arc<VideoPipeline>,
}
