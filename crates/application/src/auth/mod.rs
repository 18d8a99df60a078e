//! Session handling: credential storage, token refresh and sign-out.
//!
//! - [`TokenStore`] keeps the credential pair and cached profiles
//! - [`RefreshCoordinator`] runs at most one refresh at a time
//! - [`ForcedLogout`] signs the user out after a grace period
//! - [`AuthService`] talks to the `/auth` endpoints

mod forced_logout;
mod refresh;
mod service;
mod token_store;

pub use forced_logout::ForcedLogout;
pub use refresh::{REFRESH_PATH, RefreshCoordinator};
pub use service::AuthService;
pub use token_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TENANT_KEY, TokenStore, USER_KEY};
