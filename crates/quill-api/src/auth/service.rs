//! Authentication service layer
//!
//! Business logic for registration, login, token refresh, and logout.
//! Owns the refresh-token rotation and revocation invariants: a refresh
//! token rotates exactly once, and any second use of a consumed token
//! revokes every session the user holds.

use super::password::{hash_password, verify_password};
use super::token::{issue_token_pair, verify_token, TokenError};
use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use quill_core::{AuthConfig, User, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Logout request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Login response with tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
}

/// Rotated token pair response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Public view of a user record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    auth: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }

    /// Register a new user.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserInfo, AppError> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Validation("Email already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AppError::Configuration(format!("password hashing failed: {e}")))?;

        let user = self
            .store
            .insert(User::new(request.email, request.username, password_hash))
            .await?;

        audit_log(&AuditEvent::RegistrationSuccess {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(UserInfo::from(&user))
    }

    /// Login with email and password, issuing a fresh token pair.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = match self.store.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                audit_log(&AuditEvent::LoginFailure {
                    email: request.email.clone(),
                    reason: "unknown email".to_string(),
                });
                return Err(AppError::InvalidCredentials);
            }
        };

        let password_ok = verify_password(&request.password, &user.password_hash)
            .map_err(|e| AppError::Storage(format!("stored password hash unreadable: {e}")))?;

        if !password_ok {
            audit_log(&AuditEvent::LoginFailure {
                email: request.email.clone(),
                reason: "wrong password".to_string(),
            });
            return Err(AppError::InvalidCredentials);
        }

        // Issue before touching the store; a signing failure must leave the
        // user record unchanged.
        let pair = issue_token_pair(&self.auth, user.id)
            .map_err(|e| AppError::Configuration(format!("token issuance failed: {e}")))?;

        self.store
            .push_refresh_token(user.id, &pair.refresh_token)
            .await?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(LoginResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user_id: user.id,
        })
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// The presented token rotates exactly once. Presenting a token that
    /// is signed correctly but no longer in the stored set is treated as
    /// replay: every session for the user is revoked.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<TokenResponse, AppError> {
        let token = required_token(request.refresh_token.as_deref())?;
        let user = self.resolve_refresh_token(token).await?;

        if !user.refresh_tokens.iter().any(|t| t == token) {
            self.revoke_all_sessions(&user).await?;
            return Err(AppError::StaleToken);
        }

        let pair = match issue_token_pair(&self.auth, user.id) {
            Ok(pair) => pair,
            Err(e) => {
                // Fail safe, not fail open.
                self.store.clear_refresh_tokens(user.id).await?;
                return Err(AppError::Configuration(format!("token issuance failed: {e}")));
            }
        };

        // Single conditional operation; losing it to a concurrent refresh
        // means the token was already consumed.
        let rotated = self
            .store
            .swap_refresh_token(user.id, token, &pair.refresh_token)
            .await?;
        if !rotated {
            self.revoke_all_sessions(&user).await?;
            return Err(AppError::StaleToken);
        }

        audit_log(&AuditEvent::TokenRefresh { user_id: user.id });

        Ok(TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    /// Revoke a single refresh token.
    pub async fn logout(&self, request: LogoutRequest) -> Result<(), AppError> {
        let token = required_token(request.refresh_token.as_deref())?;
        let user = self.resolve_refresh_token(token).await?;

        if !user.refresh_tokens.iter().any(|t| t == token) {
            // Revoke-on-suspicion: a token this user does not hold voids
            // every session.
            self.revoke_all_sessions(&user).await?;
            return Err(AppError::StaleToken);
        }

        let removed = self.store.remove_refresh_token(user.id, token).await?;
        if !removed {
            self.revoke_all_sessions(&user).await?;
            return Err(AppError::StaleToken);
        }

        audit_log(&AuditEvent::Logout { user_id: user.id });
        Ok(())
    }

    /// Fetch the public record for a user id.
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserInfo, AppError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(UserInfo::from(&user))
    }

    /// Verify a refresh token's signature and expiry, then load its subject.
    async fn resolve_refresh_token(&self, token: &str) -> Result<User, AppError> {
        let claims = verify_token(&self.auth, token).map_err(|e| match e {
            TokenError::MissingSecret => {
                AppError::Configuration("signing secret is not configured".to_string())
            }
            e => {
                audit_log(&AuditEvent::InvalidToken {
                    reason: e.to_string(),
                });
                AppError::InvalidToken
            }
        })?;

        let subject = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        self.store
            .find_by_id(subject)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    async fn revoke_all_sessions(&self, user: &User) -> Result<(), AppError> {
        self.store.clear_refresh_tokens(user.id).await?;
        audit_log(&AuditEvent::TokenReuse {
            user_id: user.id,
            sessions_revoked: user.refresh_tokens.len(),
        });
        Ok(())
    }
}

fn required_token(token: Option<&str>) -> Result<&str, AppError> {
    match token {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(AppError::MissingToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::issue_token;
    use quill_core::MemoryUserStore;

    fn service(secret: Option<&str>) -> AuthService {
        let auth = AuthConfig {
            token_secret: secret.map(String::from),
            access_ttl_secs: 900,
            refresh_ttl_secs: 86400,
        };
        AuthService::new(Arc::new(MemoryUserStore::new()), auth)
    }

    async fn register_and_login(svc: &AuthService) -> LoginResponse {
        svc.register(RegisterRequest {
            email: "bob@example.com".to_string(),
            username: "bob".to_string(),
            password: "hunter2!".to_string(),
        })
        .await
        .unwrap();

        svc.login(LoginRequest {
            email: "bob@example.com".to_string(),
            password: "hunter2!".to_string(),
        })
        .await
        .unwrap()
    }

    fn refresh_req(token: &str) -> RefreshRequest {
        RefreshRequest {
            refresh_token: Some(token.to_string()),
        }
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let svc = service(Some("secret"));
        register_and_login(&svc).await;

        let unknown = svc
            .login(LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter2!".to_string(),
            })
            .await;
        let wrong = svc
            .login(LoginRequest {
                email: "bob@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;

        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh_rotates_exactly_once() {
        let svc = service(Some("secret"));
        let login = register_and_login(&svc).await;

        let rotated = svc.refresh(refresh_req(&login.refresh_token)).await.unwrap();
        assert_ne!(rotated.refresh_token, login.refresh_token);

        // Replaying the consumed token fails and cascades: the rotated
        // successor is revoked too.
        let replay = svc.refresh(refresh_req(&login.refresh_token)).await;
        assert!(matches!(replay, Err(AppError::StaleToken)));

        let successor = svc.refresh(refresh_req(&rotated.refresh_token)).await;
        assert!(matches!(successor, Err(AppError::StaleToken)));
    }

    #[tokio::test]
    async fn test_logout_then_refresh_fails() {
        let svc = service(Some("secret"));
        let login = register_and_login(&svc).await;

        svc.logout(LogoutRequest {
            refresh_token: Some(login.refresh_token.clone()),
        })
        .await
        .unwrap();

        let result = svc.refresh(refresh_req(&login.refresh_token)).await;
        assert!(matches!(result, Err(AppError::StaleToken)));
    }

    #[tokio::test]
    async fn test_missing_and_empty_tokens_are_rejected() {
        let svc = service(Some("secret"));

        let missing = svc.refresh(RefreshRequest { refresh_token: None }).await;
        assert!(matches!(missing, Err(AppError::MissingToken)));

        let empty = svc.refresh(refresh_req("")).await;
        assert!(matches!(empty, Err(AppError::MissingToken)));
    }

    #[tokio::test]
    async fn test_missing_secret_is_a_configuration_error() {
        let svc = service(None);
        svc.register(RegisterRequest {
            email: "bob@example.com".to_string(),
            username: "bob".to_string(),
            password: "hunter2!".to_string(),
        })
        .await
        .unwrap();

        let login = svc
            .login(LoginRequest {
                email: "bob@example.com".to_string(),
                password: "hunter2!".to_string(),
            })
            .await;
        assert!(matches!(login, Err(AppError::Configuration(_))));

        let refresh = svc.refresh(refresh_req("some.jwt.value")).await;
        assert!(matches!(refresh, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_refresh_for_deleted_user_is_not_found() {
        let svc = service(Some("secret"));
        let auth = AuthConfig {
            token_secret: Some("secret".to_string()),
            access_ttl_secs: 900,
            refresh_ttl_secs: 86400,
        };
        let token = issue_token(&auth, Uuid::new_v4(), 86400).unwrap();

        let result = svc.refresh(refresh_req(&token)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
