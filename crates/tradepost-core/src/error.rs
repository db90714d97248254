//! Error types for the tradepost crates.

use thiserror::Error;

/// A shared error type for the tradepost workspace.
///
/// Provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum MarketError {
    /// Entity not found error with type information
    #[error("{entity_type} not found: '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// An actor attempted an operation outside its capabilities
    #[error("access denied: {action} ({reason})")]
    AccessDenied {
        action: &'static str,
        reason: &'static str,
    },

    /// Authentication collaborator failure (register/login/logout)
    #[error("authentication error: {0}")]
    Auth(String),

    /// Input rejected before it reached storage
    #[error("validation error: {0}")]
    Validation(String),

    /// Document store failure, tagged with the operation that hit it
    #[error("storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {format} - {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl MarketError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an AccessDenied error
    pub fn access_denied(action: &'static str, reason: &'static str) -> Self {
        Self::AccessDenied { action, reason }
    }

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Storage error
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an AccessDenied error
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON",
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MarketError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML",
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MarketError>`.
pub type Result<T> = std::result::Result<T, MarketError>;
