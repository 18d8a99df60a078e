//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A request path is not relative to the API base.
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A settings value is out of range.
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting {
        /// Setting name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A resource name is not one of the known business collections.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
