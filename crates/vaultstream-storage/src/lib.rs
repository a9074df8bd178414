//! Vaultstream Storage Library
//!
//! This crate provides the storage abstraction used by the upload pipeline and the
//! API. It includes the `Storage` trait and implementations for S3 and the local
//! filesystem.
//!
//! # Storage references
//!
//! `Storage::save` returns an opaque reference that callers persist as a string and
//! hand back for presigning or deletion:
//!
//! - **Local**: `local,{key}`
//! - **S3**: `{bucket},{key}`
//!
//! References are split on the first comma only, so keys may contain commas while
//! backend identifiers may not. Keys must not contain `..` segments or a leading `/`;
//! validation is centralized in the `keys` module so all backends stay consistent.

pub mod body;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod reference;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use body::{SeekableRead, UploadBody};
pub use factory::create_storage;
pub use keys::validate_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reference::{StorageReference, LOCAL_NAMESPACE};
#[cfg(feature = "storage-s3")]
pub use s3::{AmazonS3Client, ObjectClient, RetryPolicy, S3Storage};
pub use signing::{SignatureVerifier, UrlSigner};
pub use traits::{Storage, StorageError, StorageResult};
pub use vaultstream_core::StorageBackend;
