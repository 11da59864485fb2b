//! User store abstraction
//!
//! The credential store is an external collaborator: Quill only assumes a
//! conventional persistence interface (find by id, find by filter, create,
//! update, delete) plus a handful of token-set operations that must be
//! atomic per call. `MemoryUserStore` is the in-process reference
//! implementation used by the binary and the test suite; a database-backed
//! implementation satisfies the same trait with conditional updates.

use crate::User;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence interface for user credential records.
///
/// The token-set operations each execute as one atomic step from the
/// caller's point of view. In particular `swap_refresh_token` must remove
/// the old token and insert the new one in a single operation that fails
/// when the removal target is absent; a read-modify-write sequence would
/// race against concurrent refresh calls for the same user.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Look up a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with `EmailAlreadyExists` on a duplicate email.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Replace the stored record for `user.id` with `user`.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Delete a user. Returns `false` if no such user existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Append a refresh token to the user's set.
    async fn push_refresh_token(&self, id: Uuid, token: &str) -> Result<(), StoreError>;

    /// Atomically replace `old` with `new` in the user's set.
    ///
    /// Returns `false` without mutating anything if `old` is not present,
    /// e.g. because a concurrent refresh already rotated it out.
    async fn swap_refresh_token(&self, id: Uuid, old: &str, new: &str)
        -> Result<bool, StoreError>;

    /// Atomically remove a refresh token. Returns `false` if it was absent.
    async fn remove_refresh_token(&self, id: Uuid, token: &str) -> Result<bool, StoreError>;

    /// Revoke every refresh token the user holds.
    async fn clear_refresh_tokens(&self, id: Uuid) -> Result<(), StoreError>;
}

/// In-memory user store.
///
/// Every operation takes the write lock at most once, so the token-set
/// operations are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailAlreadyExists);
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(StoreError::UserNotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn push_refresh_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        user.refresh_tokens.push(token.to_string());
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        old: &str,
        new: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        match user.refresh_tokens.iter().position(|t| t == old) {
            Some(idx) => {
                user.refresh_tokens[idx] = new.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_refresh_token(&self, id: Uuid, token: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        match user.refresh_tokens.iter().position(|t| t == token) {
            Some(idx) => {
                user.refresh_tokens.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_refresh_tokens(&self, id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        user.refresh_tokens.clear();
        Ok(())
    }
}
