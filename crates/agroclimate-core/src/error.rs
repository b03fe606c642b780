//! Error types for the AgroClimate Analyst application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire application.
///
/// This provides typed, structured error variants so callers can branch on
/// the failure class instead of string-matching messages.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalystError {
    /// Configuration error (missing credential, bad environment)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure at the external service boundary (network, non-2xx,
    /// malformed response)
    #[error("Gemini API error: {message}")]
    Gateway { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalystError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Gateway error
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a gateway error
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Gateway { .. })
    }
}

/// A type alias for `Result<T, AnalystError>`.
pub type Result<T> = std::result::Result<T, AnalystError>;
