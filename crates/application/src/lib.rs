//! Agenda Application - Session handling and the authenticated request pipeline
//!
//! This crate contains the logic between the domain types and the
//! infrastructure adapters: the token store, single-flight refresh, the
//! forced-logout timer and the API client that ties them together.

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use auth::{AuthService, ForcedLogout, RefreshCoordinator, TokenStore};
pub use client::{ApiClient, Disposition};
pub use error::{ApplicationError, ApplicationResult};
pub use events::EventBus;
pub use use_cases::{GetAvailableSlots, ResourceApi};
