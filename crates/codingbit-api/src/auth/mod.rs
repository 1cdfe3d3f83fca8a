//! Authentication: session tokens, password hashing and password reset
//! tokens.

pub mod jwt;
pub mod password;
pub mod reset_token;

pub use jwt::{JwtClaims, JwtService};
