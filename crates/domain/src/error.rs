//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request path is not a valid relative URL.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request body cannot be serialized as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A JSON path expression is malformed.
    #[error("invalid JSON path '{path}': {reason}")]
    InvalidJsonPath {
        /// The offending expression.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A check tried to move between phases in an order the lifecycle forbids.
    #[error("invalid phase transition: {from} -> {to}")]
    InvalidPhaseTransition {
        /// Phase the check was in.
        from: &'static str,
        /// Phase that was requested.
        to: &'static str,
    },

    /// Runner settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
