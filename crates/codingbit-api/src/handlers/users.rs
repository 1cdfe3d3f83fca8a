//! User account endpoints: signup, login and password recovery.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use codingbit_core::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, ResetPasswordRequest,
    SignupRequest, UserResponse,
};
use codingbit_core::AppError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::{password, reset_token};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Create a new account and start a session.
#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    ),
    tag = "users"
)]
#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpAppError> {
    payload.validate().map_err(AppError::from)?;

    let password_hash = password::hash_password(&payload.password)?;
    let user = state
        .users
        .create(&payload.email, &payload.nickname, &password_hash)
        .await?;

    info!(user_id = %user.id, "User signed up");

    let token = state.jwt.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    ),
    tag = "users"
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, HttpAppError> {
    payload.validate().map_err(AppError::from)?;

    // Same message for unknown email and wrong password.
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid().into());
    }

    info!(user_id = %user.id, "User logged in");

    let token = state.jwt.issue(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Request a password reset link.
#[utoipa::path(
    post,
    path = "/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Acknowledged", body = MessageResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
    ),
    tag = "users"
)]
#[tracing::instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    payload.validate().map_err(AppError::from)?;

    // The response never reveals whether the address has an account.
    let reply = MessageResponse::new(
        "If an account exists for this address, a reset link has been sent.",
    );

    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        return Ok(Json(reply));
    };

    let ttl = Duration::from_secs(state.config.password_reset_ttl_minutes * 60);
    let token = reset_token::create(user.id, ttl, state.config.jwt_secret.as_bytes());

    let reset_link = state.config.frontend_url.as_deref().map(|base| {
        format!(
            "{}/reset-password?token={}",
            base.trim_end_matches('/'),
            token
        )
    });

    match &state.email {
        Some(email) => {
            if let Err(e) = email
                .send_password_reset(&user.email, &token, reset_link.as_deref())
                .await
            {
                warn!(error = %e, "Failed to send password reset email");
            }
        }
        None => {
            warn!(user_id = %user.id, "SMTP not configured; skipping password reset email");
        }
    }

    Ok(Json(reply))
}

/// Set a new password using a reset token.
#[utoipa::path(
    post,
    path = "/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
    ),
    tag = "users"
)]
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    payload.validate().map_err(AppError::from)?;

    let user_id = reset_token::verify(&payload.token, state.config.jwt_secret.as_bytes())?;

    let password_hash = password::hash_password(&payload.new_password)?;
    state.users.update_password(user_id, &password_hash).await?;

    info!(user_id = %user_id, "Password reset completed");

    Ok(Json(MessageResponse::new("Password has been reset.")))
}
