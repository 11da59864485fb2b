/// Authentication middleware for protecting routes
///
/// Extracts and validates the bearer token from the Authorization header.
/// On success the verified subject id is added to request extensions for
/// downstream handlers. Validation is fully stateless: the gate never
/// touches the user store, so a revoked-but-unexpired access token still
/// passes. Access-token lifetime is kept short for exactly that reason.
use super::token::{verify_token, TokenError};
use crate::audit::{audit_log, AuditEvent};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Authenticated subject extracted from a verified access token.
///
/// Added to request extensions by [`auth_middleware`]; handlers extract it
/// with `Extension<AuthenticatedUser>` and use the id to stamp ownership
/// on created resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Authentication middleware errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Signing secret is not configured")]
    ServerMisconfigured,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuthHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::ServerMisconfigured => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Authentication middleware that requires a valid access token.
///
/// Checks run in order: header present, Bearer scheme, secret configured
/// (a server fault, not a client fault), then signature and expiry.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    if state.config.auth.token_secret.is_none() {
        return Err(AuthError::ServerMisconfigured);
    }

    let claims = verify_token(&state.config.auth, token).map_err(|e| {
        audit_log(&AuditEvent::InvalidToken {
            reason: e.to_string(),
        });
        match e {
            TokenError::MissingSecret => AuthError::ServerMisconfigured,
            _ => AuthError::InvalidToken,
        }
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    request.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
