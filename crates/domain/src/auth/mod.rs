//! Authentication domain types

mod session;
mod types;

pub use session::{SessionState, SessionTrigger};
pub use types::{
    AuthSession, CredentialPair, LoginRequest, ProfileSnapshot, RefreshRequest, RegisterRequest,
    TenantProfile, TokenEnvelope, UserProfile, token_preview,
};
