//! Request utilities.

pub mod upload;
