//! services/api/src/auth/token.rs
//!
//! Issues and validates the signed, self-contained access tokens carried
//! as bearer credentials. Tokens embed the caller's identity and role and
//! are valid until natural expiry; there is no revocation list.

use chrono::{Duration, Utc};
use clinic_core::domain::Role;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors surfaced by token validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    InvalidToken,
}

/// The claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email address.
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    /// Expiry as a unix timestamp, set at issue time from the configured TTL.
    pub exp: i64,
}

/// Signs a token for `user` with the given TTL.
pub fn issue_token(
    sub: &str,
    user_id: Uuid,
    role: Role,
    secret: &str,
    ttl_minutes: i64,
) -> Result<String, AuthError> {
    let claims = Claims {
        sub: sub.to_string(),
        user_id,
        role,
        exp: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verifies the signature and expiry of `token` and returns its claims.
///
/// Expiry is reported distinctly; bad signatures and malformed input both
/// collapse into `InvalidToken`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidToken,
    })
}
