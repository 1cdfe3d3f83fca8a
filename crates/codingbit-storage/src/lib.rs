//! Object storage and staging for uploaded media.
//!
//! Published objects go to a pluggable [`ObjectStorage`] backend (S3 or a
//! local directory, feature gated). In-flight uploads live in a [`Staging`]
//! area that guarantees request-scoped temporary files can always be
//! released.

pub mod factory;
pub mod staging;
pub mod traits;

#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;

pub use factory::create_storage;
pub use staging::{DiskStaging, StagedFile, Staging};
pub use traits::{ObjectStorage, StorageError, StorageResult};

#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;

pub use codingbit_core::StorageBackend;
