//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Codingbit API",
        description = "User accounts and video publishing for the codingbit platform."
    ),
    paths(
        handlers::upload::upload_video,
        handlers::users::signup,
        handlers::users::login,
        handlers::users::forgot_password,
        handlers::users::reset_password,
        handlers::health::health_check,
    ),
    components(schemas(
        codingbit_core::models::UploadResponse,
        codingbit_core::models::UserResponse,
        codingbit_core::models::AuthResponse,
        codingbit_core::models::SignupRequest,
        codingbit_core::models::LoginRequest,
        codingbit_core::models::ForgotPasswordRequest,
        codingbit_core::models::ResetPasswordRequest,
        codingbit_core::models::MessageResponse,
        ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Video upload and publishing"),
        (name = "users", description = "Accounts and sessions"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
