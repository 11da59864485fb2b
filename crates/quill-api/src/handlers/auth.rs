//! Authentication API handlers
//!
//! Thin HTTP layer over the session service. Status codes here are part
//! of the external contract; see `error.rs` for the mapping.

use crate::auth::{
    AuthService, AuthenticatedUser, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Logout response
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.store.clone(), state.config.auth.clone())
}

/// Register a new user account. Returns the created user.
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth_service(&state).register(request).await?;
    Ok(Json(user))
}

/// Login with email and password, returning an access/refresh token pair.
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = auth_service(&state).login(request).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new pair (the old token rotates out).
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = auth_service(&state).refresh(request).await?;
    Ok(Json(response))
}

/// Revoke the presented refresh token.
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_service(&state).logout(request).await?;
    Ok(Json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}

/// Get the authenticated user's profile.
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let user_info = auth_service(&state).get_user(user.user_id).await?;
    Ok(Json(user_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logout_response_serialization() {
        let response = LogoutResponse {
            message: "Logged out".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("Logged out"));
    }
}
