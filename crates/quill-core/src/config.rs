//! Quill configuration management
//!
//! Handles configuration from environment variables and optional TOML
//! files with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Token signing and lifetime configuration
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }

        // Tokens
        if let Ok(secret) = std::env::var("TOKEN_SECRET") {
            if !secret.is_empty() {
                config.auth.token_secret = Some(secret);
            }
        }
        if let Ok(ttl) = std::env::var("ACCESS_TOKEN_TTL_SECS") {
            config.auth.access_ttl_secs =
                ttl.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ACCESS_TOKEN_TTL_SECS".to_string(),
                    value: ttl,
                })?;
        }
        if let Ok(ttl) = std::env::var("REFRESH_TOKEN_TTL_SECS") {
            config.auth.refresh_ttl_secs =
                ttl.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "REFRESH_TOKEN_TTL_SECS".to_string(),
                    value: ttl,
                })?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Token signing and lifetime configuration.
///
/// There is deliberately no default secret: with `token_secret` unset,
/// every token-issuing and token-verifying path reports a server error
/// instead of signing with a well-known value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret, from `TOKEN_SECRET`
    pub token_secret: Option<String>,

    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            access_ttl_secs: 900,        // 15 minutes
            refresh_ttl_secs: 7 * 86400, // 7 days
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.access_ttl_secs, 900);
        assert_eq!(config.auth.refresh_ttl_secs, 7 * 86400);
        assert!(config.auth.token_secret.is_none());
    }

    #[test]
    fn test_default_access_ttl_shorter_than_refresh_ttl() {
        // Access tokens cannot be revoked early; their lifetime stays short.
        let config = AuthConfig::default();
        assert!(config.access_ttl_secs < config.refresh_ttl_secs);
    }
}
