//! Data models for the application
//!
//! Request and response shapes plus the persisted user entity, organized by
//! domain.

mod upload;
mod user;

// Re-export all models for convenient imports
pub use upload::*;
pub use user::*;
