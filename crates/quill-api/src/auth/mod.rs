//! Authentication and authorization module
//!
//! Components of the token lifecycle:
//! - Token issuance and validation (signed claims, HS256)
//! - Password hashing with Argon2
//! - Middleware for request authentication
//! - The session service owning rotation and revocation

pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use middleware::{auth_middleware, AuthError, AuthenticatedUser};
pub use password::{hash_password, verify_password};
pub use service::{
    AuthService, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RegisterRequest,
    TokenResponse, UserInfo,
};
pub use token::{issue_token, issue_token_pair, verify_token, Claims, TokenError, TokenPair};
