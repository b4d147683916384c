use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::response::ErrorInfo;

/// Unified error type for the gateway's internal plumbing.
///
/// Adapter-level calls never surface this directly: it is flattened into an
/// [`ErrorInfo`] and returned inside an `Envelope`. Construction paths
/// (configuration, builder, factory) return it as a plain `Result`.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Create a new config error
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new storage error
    pub fn storage<T: Into<String>>(msg: T) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new authentication error
    pub fn auth<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            GatewayError::Config(_) => "config",
            GatewayError::Storage(_) => "storage",
            GatewayError::Authentication(_) => "auth",
            GatewayError::Network(_) => "network",
            GatewayError::Serialization(_) => "serialization",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Unsupported(_) => "not_supported",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::ExternalService(_) => "external_service",
            GatewayError::Internal(_) => "internal",
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_) | GatewayError::Timeout(_) | GatewayError::ExternalService(_)
        )
    }

    /// Flatten into the `{message, code}` body used by envelopes
    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.to_string()).with_code(self.category())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => GatewayError::NotFound(err.to_string()),
            std::io::ErrorKind::TimedOut => GatewayError::Timeout(err.to_string()),
            _ => GatewayError::Storage(format!("I/O error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(format!("HTTP timeout: {}", err))
        } else if err.is_connect() {
            GatewayError::Network(format!("HTTP connection error: {}", err))
        } else if err.is_decode() {
            GatewayError::Serialization(format!("HTTP body decode error: {}", err))
        } else {
            GatewayError::ExternalService(format!("HTTP error: {}", err))
        }
    }
}

impl From<GatewayError> for ErrorInfo {
    fn from(err: GatewayError) -> Self {
        err.to_error_info()
    }
}
