//! Agenda Domain - Core types of the scheduling API client
//!
//! This crate defines the domain model shared by every layer:
//! credentials and session state, request/response descriptors,
//! error payloads and the user-facing message table.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod event;
pub mod messages;
pub mod request;
pub mod resource;
pub mod response;
pub mod settings;

pub use auth::{
    AuthSession, CredentialPair, LoginRequest, ProfileSnapshot, RefreshRequest, RegisterRequest,
    SessionState, SessionTrigger, TenantProfile, TokenEnvelope, UserProfile,
};
pub use error::{DomainError, DomainResult};
pub use event::{ClientEvent, Notification, NotificationLevel};
pub use request::{ApiRequest, Header, Headers, HttpMethod};
pub use resource::{Resource, SlotQuery};
pub use response::{ApiResponse, ErrorBody};
pub use settings::ClientSettings;
