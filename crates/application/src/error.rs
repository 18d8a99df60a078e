//! Application error types

use agenda_domain::{DomainError, messages};
use thiserror::Error;

use crate::ports::{HttpClientError, StoreError};

/// Application-level errors returned to callers of the API client.
///
/// `Clone` so the outcome of one refresh can be handed to every queued request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// No response within the deadline.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },

    /// No response at all: DNS failure, refused or dropped connection.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The request could not be sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The access token expired and could not be refreshed.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// A 401 without expiry marker: the stored credentials are not valid.
    #[error("credentials rejected")]
    Unauthorized,

    /// A refresh was needed but no refresh token is stored.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status.
        status: u16,
        /// Machine-readable code from the body.
        code: Option<String>,
        /// User-facing message.
        message: String,
        /// Raw body, for callers that need more detail.
        body: String,
    },

    /// The credential store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Serialization(String),
}

impl ApplicationError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } => messages::TIMEOUT_ERROR.to_string(),
            Self::Unreachable(_) => messages::UNREACHABLE_ERROR.to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::SessionExpired(_) | Self::Unauthorized | Self::NotAuthenticated => {
                messages::status_message(401).to_string()
            }
            _ => messages::GENERIC_ERROR.to_string(),
        }
    }

    /// HTTP status of the failed call, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired(_) | Self::Unauthorized => Some(401),
            _ => None,
        }
    }
}

impl From<HttpClientError> for ApplicationError {
    fn from(error: HttpClientError) -> Self {
        match error {
            HttpClientError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            e if e.is_unreachable() => Self::Unreachable(e.to_string()),
            HttpClientError::InvalidUrl(m) | HttpClientError::InvalidBody(m) => {
                Self::InvalidRequest(m)
            }
            other => Self::Unreachable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApplicationError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
