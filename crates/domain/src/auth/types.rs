//! Credential and profile types exchanged with the `/auth` endpoints

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Access/refresh token pair issued by login, registration and refresh.
///
/// The access token is attached to every outgoing request while present.
/// The refresh token only ever travels to `/auth/refresh` and `/auth/logout`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Longer-lived credential used to mint a new access token.
    pub refresh_token: String,
}

impl CredentialPair {
    /// Creates a new credential pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns the `Authorization` header value for the access token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Get a preview of a token (first 8 chars + ...), safe for logs.
#[must_use]
pub fn token_preview(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((idx, _)) if token.len() > 12 => format!("{}...", &token[..idx]),
        _ => "***".to_string(),
    }
}

/// Authenticated user as returned by the backend.
///
/// Only the fields the client reads are typed; everything else is kept
/// verbatim in `extra` so the cached profile round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role inside the tenant (owner, staff, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Untyped remainder of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Creates a profile with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            role: None,
            extra: Map::new(),
        }
    }

    /// Name to show in prompts, falling back to the e-mail, then the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Business (tenant) the user belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantProfile {
    /// Tenant identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Business name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL-safe tenant handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Untyped remainder of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a successful `/auth/login` or `/auth/register` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The signed-in user.
    pub user: UserProfile,
    /// The user's tenant, absent for platform-level accounts.
    #[serde(default)]
    pub tenant: Option<TenantProfile>,
    /// Issued credentials.
    pub tokens: CredentialPair,
}

/// Body of `/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Current user.
    pub user: UserProfile,
    /// Current tenant.
    #[serde(default)]
    pub tenant: Option<TenantProfile>,
}

/// Body of a successful `/auth/refresh` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEnvelope {
    /// Rotated credentials.
    pub tokens: CredentialPair,
}

/// Payload for `/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Login e-mail.
    pub email: String,
    /// Plain-text password, sent over TLS only.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Payload for `/auth/register`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Owner name.
    pub name: String,
    /// Login e-mail.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Name of the business being created.
    pub business_name: String,
    /// Optional contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("business_name", &self.business_name)
            .finish_non_exhaustive()
    }
}

/// Payload for `/auth/refresh` and `/auth/logout`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token being exchanged or revoked.
    pub refresh_token: String,
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}
