//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. `agenda.{toml,yaml,json}` in the working directory, or an explicit file
//! 3. `AGENDA__SECTION__KEY` environment variables, e.g. `AGENDA__CLIENT__API_URL`

use std::collections::HashMap;
use std::path::Path;

use agenda_domain::settings::{DEFAULT_API_URL, DEFAULT_LOGOUT_GRACE_SECS, DEFAULT_TIMEOUT_MS};
use agenda_domain::{ClientSettings, DomainError};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

/// Prefix of the environment variables read.
pub const ENV_PREFIX: &str = "AGENDA";
/// Separator between prefix, section and key.
pub const ENV_SEPARATOR: &str = "__";
/// Base name of the optional configuration file.
pub const DEFAULT_FILE_STEM: &str = "agenda";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values loaded but are not usable.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Full application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// API client settings.
    #[serde(default)]
    pub client: ClientSettings,
    /// Inbound webhook settings, read by [`WebhookGuard::from_settings`](crate::WebhookGuard::from_settings).
    /// The CLI ignores them.
    #[serde(default)]
    pub webhook: WebhookSettings,
}

/// Shared secret presented by the automation service on inbound calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookSettings {
    /// Expected token. Webhooks are rejected when unset.
    pub token: Option<Secret<String>>,
}

/// Loads configuration from defaults, the optional file and the environment.
///
/// With `file` set, that file must exist. Otherwise `agenda.*` in the
/// working directory is used if present.
///
/// # Errors
///
/// Returns an error if a source is malformed or the result is invalid.
pub fn load_config(file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_env(file, None)
}

fn load_with_env(
    file: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig, ConfigError> {
    let builder = config::Config::builder()
        .set_default("client.api_url", DEFAULT_API_URL)?
        .set_default("client.timeout_ms", DEFAULT_TIMEOUT_MS)?
        .set_default("client.logout_grace_secs", DEFAULT_LOGOUT_GRACE_SECS)?;

    let builder = match file {
        Some(path) => builder.add_source(config::File::from(path).required(true)),
        None => builder.add_source(config::File::with_name(DEFAULT_FILE_STEM).required(false)),
    };

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    let app: AppConfig = settings.try_deserialize()?;
    app.client.validate()?;
    tracing::debug!(api_url = %app.client.api_url, timeout_ms = app.client.timeout_ms, "configuration loaded");
    Ok(app)
}
