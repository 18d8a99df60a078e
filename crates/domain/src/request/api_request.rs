//! Request descriptor passed through the client pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Paths under this prefix form the authentication boundary.
///
/// Failures on these endpoints never trigger a token refresh and never
/// produce the generic error notification.
pub const AUTH_BOUNDARY_PREFIX: &str = "/auth/";

/// Complete description of one call against the API.
///
/// The descriptor is never mutated by the client pipeline: attaching a
/// bearer token or retrying produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Correlation id, kept across retries.
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    /// Query parameters in insertion order.
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// JSON body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Per-request timeout overriding the client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// How many times this request has already been replayed.
    #[serde(default)]
    attempt: u8,
}

impl ApiRequest {
    /// Creates a request for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a relative path starting with `/`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> DomainResult<Self> {
        let path = path.into();
        if !path.starts_with('/') || path.starts_with("//") || path.contains("://") {
            return Err(DomainError::InvalidPath(path));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            method,
            path,
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
            timeout_ms: None,
            attempt: 0,
        })
    }

    /// Creates a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn get(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn post(path: impl Into<String>, body: Value) -> DomainResult<Self> {
        Ok(Self::new(HttpMethod::Post, path)?.with_body(body))
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Overrides the client timeout for this request.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns a copy carrying `Authorization: Bearer <token>`.
    #[must_use]
    pub fn authorized(&self, access_token: &str) -> Self {
        self.clone()
            .with_header("Authorization", format!("Bearer {access_token}"))
    }

    /// Returns the replay of this request, with the attempt counter bumped.
    #[must_use]
    pub fn retried(&self) -> Self {
        let mut next = self.clone();
        next.attempt = self.attempt.saturating_add(1);
        next
    }

    /// Number of replays already performed.
    #[must_use]
    pub const fn attempt(&self) -> u8 {
        self.attempt
    }

    /// Returns true if this request is itself a replay.
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        self.attempt > 0
    }

    /// Returns true if the path targets the authentication boundary.
    #[must_use]
    pub fn is_auth_boundary(&self) -> bool {
        self.path.starts_with(AUTH_BOUNDARY_PREFIX)
    }

    /// Bearer token currently attached, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}
