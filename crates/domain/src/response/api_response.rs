//! HTTP response as seen by the client pipeline

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ErrorBody;
use crate::request::Headers;

/// HTTP response as seen by the client pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body as string
    pub body: String,
    /// Response time
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
            duration: Duration::ZERO,
        }
    }

    /// Creates a response with a JSON body.
    #[must_use]
    pub fn json_body(status: u16, body: &Value) -> Self {
        let mut response = Self::new(status, body.to_string());
        response.headers.set("Content-Type", "application/json");
        response
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the status code indicates a client error (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Returns true if the status code indicates a server error (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Deserializes the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Parses the body as untyped JSON, `None` if empty or not JSON.
    #[must_use]
    pub fn json_value(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }

    /// Server-provided message of a successful call, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.json_value()?
            .get("message")?
            .as_str()
            .filter(|m| !m.trim().is_empty())
            .map(String::from)
    }

    /// Parses the error payload. Missing or non-JSON bodies yield an empty one.
    #[must_use]
    pub fn error_body(&self) -> ErrorBody {
        self.json_value()
            .map(|value| ErrorBody::from_value(&value))
            .unwrap_or_default()
    }
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self::new(0, String::new())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
