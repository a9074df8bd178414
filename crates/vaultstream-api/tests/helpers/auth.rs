use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;
use vaultstream_api::auth::JwtClaims;

/// Test signing secret (must be at least 32 characters).
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// HS256 token for `user_id`, valid for an hour.
pub fn issue_token(user_id: Uuid) -> String {
    issue_token_with_secret(user_id, TEST_JWT_SECRET, 3600)
}

pub fn issue_token_with_secret(user_id: Uuid, secret: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id,
        exp: now + ttl_secs,
        iat: now,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode test token")
}

