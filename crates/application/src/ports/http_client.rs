//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use agenda_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send + 'a>>;

/// Errors raised when no HTTP response could be obtained.
///
/// Any response, whatever its status, is a success at this level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve host {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server actively refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Any other connection-level failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Anything else reported by the HTTP stack.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Returns true for failures where the server could not be reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::DnsError { .. } | Self::ConnectionRefused { .. } | Self::ConnectionFailed(_)
        )
    }
}

/// Port for executing HTTP requests.
///
/// The adapter resolves [`ApiRequest::path`] against its base URL, sends the
/// headers and body verbatim and enforces the deadline. It never retries.
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    fn execute(&self, request: &ApiRequest) -> HttpFuture<'_>;
}
