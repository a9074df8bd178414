//! Vaultstream Core Library
//!
//! This crate provides the domain model, error types and configuration shared by
//! the storage, processing and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::VideoRecord;
pub use repository::VideoRepository;
pub use storage_types::StorageBackend;
