//! Client settings

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Default base URL of the API.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
/// Default request deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default delay between a terminal auth failure and the forced logout.
pub const DEFAULT_LOGOUT_GRACE_SECS: u64 = 30;

/// Settings of the API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL every request path is appended to.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Grace period before a forced logout, in seconds.
    #[serde(default = "default_logout_grace_secs")]
    pub logout_grace_secs: u64,
    /// File holding the persisted credentials. In-memory when absent.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_logout_grace_secs() -> u64 {
    DEFAULT_LOGOUT_GRACE_SECS
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            logout_grace_secs: DEFAULT_LOGOUT_GRACE_SECS,
            storage_path: None,
        }
    }
}

impl ClientSettings {
    /// Request deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Forced-logout grace period.
    #[must_use]
    pub const fn logout_grace(&self) -> Duration {
        Duration::from_secs(self.logout_grace_secs)
    }

    /// Validates the settings and returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the timeout is zero.
    pub fn validate(&self) -> DomainResult<Url> {
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidSetting {
                name: "timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        let url = Url::parse(&self.api_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.logout_grace(), Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_url_and_zero_timeout() {
        let settings = ClientSettings {
            api_url: "ftp://example.com".to_string(),
            ..ClientSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = ClientSettings {
            timeout_ms: 0,
            ..ClientSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(DomainError::InvalidSetting { name: "timeout_ms", .. })
        ));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"api_url": "https://api.agenda.app"}"#).unwrap_or_default();
        assert_eq!(settings.api_url, "https://api.agenda.app");
        assert_eq!(settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
