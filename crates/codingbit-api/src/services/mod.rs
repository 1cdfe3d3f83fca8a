//! Outbound services.

pub mod email;

pub use email::EmailService;
