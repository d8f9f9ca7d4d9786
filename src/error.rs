//! Error types for the Taskdeck client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the Taskdeck client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required config field was not provided
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    /// The server rejected a request that was already retried with a fresh
    /// token; terminal for that call
    #[error("Request unauthorized")]
    Unauthorized,

    /// A refresh was needed but no refresh token is stored
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint rejected the exchange
    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    /// The session could not be refreshed; stored credentials were cleared
    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    /// Reading or writing the credential store failed
    #[error("Credential store error: {message}")]
    Store { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// The request could not reach the server
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status (other than a first 401)
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The per-request time budget expired
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The configured base URL does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Anything without a more specific variant
    #[error("{0}")]
    Other(String),

    /// Wrapped error from binary glue code
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a token refresh error
    pub fn token_refresh(message: impl Into<String>) -> Self {
        Self::TokenRefresh {
            message: message.into(),
        }
    }

    /// Create a session expired error
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::SessionExpired {
            message: message.into(),
        }
    }

    /// Create a credential store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Check if this error means the caller must re-authenticate
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::Unauthorized
                | Error::MissingRefreshToken
                | Error::SessionExpired { .. }
                | Error::TokenRefresh { .. }
        )
    }
}

/// Result type alias for the Taskdeck client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
