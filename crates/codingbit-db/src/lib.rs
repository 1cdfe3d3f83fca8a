//! Database repositories for user accounts.

pub mod users;

pub use users::{UserRepository, UserStore};
