//! Quill Core - Domain models, store abstraction, and shared types
//!
//! This crate defines the core abstractions used throughout Quill:
//! - The `User` credential record
//! - The `UserStore` persistence trait and an in-memory implementation
//! - Configuration management

pub mod config;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, LoggingConfig, ServerConfig};
pub use store::{MemoryUserStore, StoreError, UserStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user credential record.
///
/// `refresh_tokens` is the allowlist of currently valid refresh tokens for
/// this user. A refresh token is honored only while it appears here, which
/// is what makes rotation and revocation possible even though the tokens
/// themselves are stateless signed claims. The list is empty at creation
/// and mutated only through the [`UserStore`] token-set operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier, assigned at creation
    pub id: Uuid,

    /// Email address (unique, used for login)
    pub email: String,

    /// Display name (required, not unique)
    pub username: String,

    /// Argon2id password hash (PHC string), never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Currently valid refresh tokens issued to this user
    #[serde(default)]
    pub refresh_tokens: Vec<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given credentials.
    ///
    /// The password must already be hashed; this crate never sees plaintext.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            refresh_tokens: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_starts_with_no_sessions() {
        let user = User::new("bob@example.com", "bob", "$argon2id$stub");

        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.username, "bob");
        assert!(user.refresh_tokens.is_empty());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new("bob@example.com", "bob", "$argon2id$stub");
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$stub"));
        assert!(json.contains("bob@example.com"));
    }

    #[test]
    fn test_unique_ids() {
        let a = User::new("a@example.com", "a", "h");
        let b = User::new("b@example.com", "b", "h");
        assert_ne!(a.id, b.id);
    }
}
