//! Bearer authentication.
//!
//! `auth_middleware` resolves the bearer token through the configured
//! `IdentityResolver` and stores an `AuthUser` in the request extensions for the
//! handlers to extract.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{IdentityResolver, JwtClaims, JwtIdentityResolver};
pub use middleware::auth_middleware;
pub use models::AuthUser;
