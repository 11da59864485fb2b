//! Security audit logging for authentication events
//!
//! Events are serialized to JSON and logged at INFO level with the
//! "audit" target, so they can be filtered and routed to security
//! monitoring separately from application logs.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Security audit events for the token lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful user registration
    RegistrationSuccess { user_id: Uuid, email: String },

    /// Successful user login
    LoginSuccess { user_id: Uuid, email: String },

    /// Failed login attempt. The reason is internal only; the client sees
    /// the same response for unknown email and wrong password.
    LoginFailure { email: String, reason: String },

    /// Refresh token rotated for a new pair
    TokenRefresh { user_id: Uuid },

    /// A structurally valid refresh token was presented but is no longer in
    /// the user's active set. All sessions for the user were revoked.
    TokenReuse { user_id: Uuid, sessions_revoked: usize },

    /// User logged out, one refresh token revoked
    Logout { user_id: Uuid },

    /// A token failed signature or expiry checks
    InvalidToken { reason: String },
}

/// Log a security audit event with structured fields.
pub fn audit_log(event: &AuditEvent) {
    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::RegistrationSuccess { user_id, email } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Registration successful"
            );
        }
        AuditEvent::LoginSuccess { user_id, email } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure { email, reason } => {
            info!(
                target: "audit",
                event = %event_json,
                email = %email,
                reason = %reason,
                "Login failed"
            );
        }
        AuditEvent::TokenRefresh { user_id } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                "Refresh token rotated"
            );
        }
        AuditEvent::TokenReuse {
            user_id,
            sessions_revoked,
        } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                sessions_revoked = %sessions_revoked,
                "Refresh token reuse detected, all sessions revoked"
            );
        }
        AuditEvent::Logout { user_id } => {
            info!(
                target: "audit",
                event = %event_json,
                user_id = %user_id,
                "Logout"
            );
        }
        AuditEvent::InvalidToken { reason } => {
            info!(
                target: "audit",
                event = %event_json,
                reason = %reason,
                "Invalid token presented"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = AuditEvent::TokenReuse {
            user_id: Uuid::new_v4(),
            sessions_revoked: 3,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"token_reuse\""));
        assert!(json.contains("\"sessions_revoked\":3"));
    }
}
