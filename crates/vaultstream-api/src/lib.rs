//! Vaultstream API Library
//!
//! This crate provides the HTTP API: authentication, video record handlers, upload
//! endpoints, signed asset serving and application setup.

mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod repository;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use repository::InMemoryVideoRepository;
pub use state::AppState;
