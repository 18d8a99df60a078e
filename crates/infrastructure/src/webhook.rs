//! Shared-secret check for inbound automation webhooks.
//!
//! Library only: the `agenda` binary makes outbound calls and never
//! receives webhooks. A host that does builds a [`WebhookGuard`] from
//! [`AppConfig::webhook`](crate::AppConfig::webhook).

use agenda_domain::Headers;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::WebhookSettings;

/// Header carrying the shared secret.
pub const WEBHOOK_TOKEN_HEADER: &str = "X-Webhook-Token";

/// Reasons a webhook call is refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// No secret is configured, so every call is refused.
    #[error("webhook token is not configured")]
    NotConfigured,
    /// The call carried no token.
    #[error("missing webhook token")]
    Missing,
    /// The call carried the wrong token.
    #[error("invalid webhook token")]
    Invalid,
}

/// Validates the token presented by inbound webhook calls.
#[derive(Debug, Clone)]
pub struct WebhookGuard {
    token: Option<Secret<String>>,
}

impl WebhookGuard {
    /// Creates a guard expecting `token`.
    #[must_use]
    pub const fn new(token: Option<Secret<String>>) -> Self {
        Self { token }
    }

    /// Creates a guard from configuration.
    #[must_use]
    pub fn from_settings(settings: &WebhookSettings) -> Self {
        Self::new(settings.token.clone())
    }

    /// Checks `X-Webhook-Token`, falling back to `Authorization: Bearer`.
    ///
    /// # Errors
    ///
    /// Returns why the call is refused.
    pub fn verify(&self, headers: &Headers) -> Result<(), WebhookError> {
        let expected = self.token.as_ref().ok_or(WebhookError::NotConfigured)?;
        let presented = headers
            .get(WEBHOOK_TOKEN_HEADER)
            .or_else(|| {
                headers
                    .get("Authorization")
                    .and_then(|value| value.strip_prefix("Bearer "))
            })
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(WebhookError::Missing)?;

        let expected = expected.expose_secret().as_bytes();
        let presented = presented.as_bytes();
        if expected.len() == presented.len() && bool::from(expected.ct_eq(presented)) {
            Ok(())
        } else {
            tracing::warn!("rejected webhook call with invalid token");
            Err(WebhookError::Invalid)
        }
    }
}
