//! Error types for the diagnostic layer.
//!
//! Protocol failures are never errors: they become negative responses.
//! These variants cover framing and configuration problems only.

use thiserror::Error;

/// Errors outside the request/response contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticError {
    /// A frame without a service id byte.
    #[error("Empty diagnostic request")]
    EmptyRequest,

    /// Invalid diagnostic configuration.
    #[error("Invalid diagnostic configuration: {0}")]
    InvalidConfiguration(String),
}

impl DiagnosticError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result alias for diagnostic operations.
pub type DiagnosticResult<T> = Result<T, DiagnosticError>;
