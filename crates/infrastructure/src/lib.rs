//! Agenda Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.
//!
//! [`WebhookGuard`] is for hosts that receive inbound webhooks. The
//! `agenda` binary does not use it.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;
pub mod webhook;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use config::{AppConfig, ConfigError, WebhookSettings, load_config};
pub use persistence::{FileKeyValueStore, InMemoryKeyValueStore};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use webhook::{WEBHOOK_TOKEN_HEADER, WebhookError, WebhookGuard};
