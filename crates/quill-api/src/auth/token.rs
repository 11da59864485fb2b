//! Token issuance and verification
//!
//! Tokens are compact HMAC-SHA256 signed claims carrying the subject, a
//! random nonce, and an absolute expiry. Access and refresh tokens share
//! this structure and differ only in their configured lifetime.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quill_core::AuthConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Signed token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: String,
    /// Random nonce so that two tokens issued for the same subject in the
    /// same second never collide
    pub nonce: u64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: u64,
}

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Invalid token format")]
    Malformed,

    #[error("Failed to encode token: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// An access/refresh token pair issued together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a signed token for `subject` expiring `ttl_secs` from now.
///
/// Pure function of the secret, the inputs, the clock, and fresh
/// randomness; no side effects.
pub fn issue_token(config: &AuthConfig, subject: Uuid, ttl_secs: u64) -> Result<String, TokenError> {
    let secret = config
        .token_secret
        .as_deref()
        .ok_or(TokenError::MissingSecret)?;

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let claims = Claims {
        sub: subject.to_string(),
        nonce: rand::thread_rng().gen(),
        exp: now + ttl_secs,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Issue an access + refresh pair for `subject`.
///
/// Each token draws its own nonce, so concurrent logins for the same user
/// never produce colliding tokens.
pub fn issue_token_pair(config: &AuthConfig, subject: Uuid) -> Result<TokenPair, TokenError> {
    Ok(TokenPair {
        access_token: issue_token(config, subject, config.access_ttl_secs)?,
        refresh_token: issue_token(config, subject, config.refresh_ttl_secs)?,
    })
}

/// Verify a token's signature and expiry and extract its claims.
///
/// Fails, never panics: missing secret, bad signature, malformed input,
/// and expiry each map to their own variant so callers can log them apart,
/// but the contract callers rely on is binary valid/invalid.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, TokenError> {
    let secret = config
        .token_secret
        .as_deref()
        .ok_or(TokenError::MissingSecret)?;

    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(token_data.claims)
}
