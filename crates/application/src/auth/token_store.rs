//! Credential storage backed by a persistent key-value store.
//!
//! The store keeps an in-memory snapshot of the tokens and the cached
//! profiles. Both tokens are always swapped under one write lock, so a
//! reader never pairs an old access token with a new refresh token.

use std::sync::Arc;

use agenda_domain::{AuthSession, CredentialPair, TenantProfile, UserProfile};
use tokio::sync::RwLock;

use crate::ports::{KeyValueStore, StoreError};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key of the serialized user profile.
pub const USER_KEY: &str = "user";
/// Storage key of the serialized tenant profile.
pub const TENANT_KEY: &str = "tenant";

const ALL_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, TENANT_KEY];

#[derive(Debug, Clone, Default)]
struct Snapshot {
    credentials: Option<CredentialPair>,
    user: Option<UserProfile>,
    tenant: Option<TenantProfile>,
}

/// Thread-safe credential store.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates an empty store writing through to `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            snapshot: Arc::new(RwLock::new(Snapshot::default())),
        }
    }

    /// Restores the store from whatever `backend` holds.
    ///
    /// Tokens are only restored as a pair. A profile that no longer parses
    /// is dropped rather than failing the whole restore.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub async fn load(backend: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let access = backend.get(ACCESS_TOKEN_KEY).await?;
        let refresh = backend.get(REFRESH_TOKEN_KEY).await?;
        let credentials = match (access, refresh) {
            (Some(access), Some(refresh)) => Some(CredentialPair::new(access, refresh)),
            (None, None) => None,
            _ => {
                tracing::warn!("discarding half-stored credential pair");
                None
            }
        };

        let user = decode_profile(backend.get(USER_KEY).await?, USER_KEY);
        let tenant = decode_profile(backend.get(TENANT_KEY).await?, TENANT_KEY);

        Ok(Self {
            backend,
            snapshot: Arc::new(RwLock::new(Snapshot {
                credentials,
                user,
                tenant,
            })),
        })
    }

    /// Current access token.
    pub async fn access_token(&self) -> Option<String> {
        let snapshot = self.snapshot.read().await;
        snapshot.credentials.as_ref().map(|c| c.access_token.clone())
    }

    /// Current refresh token.
    pub async fn refresh_token(&self) -> Option<String> {
        let snapshot = self.snapshot.read().await;
        snapshot.credentials.as_ref().map(|c| c.refresh_token.clone())
    }

    /// Both tokens, read from the same snapshot.
    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.snapshot.read().await.credentials.clone()
    }

    /// Returns true if a credential pair is stored.
    pub async fn has_credentials(&self) -> bool {
        self.snapshot.read().await.credentials.is_some()
    }

    /// Cached user profile.
    pub async fn user(&self) -> Option<UserProfile> {
        self.snapshot.read().await.user.clone()
    }

    /// Cached tenant profile.
    pub async fn tenant(&self) -> Option<TenantProfile> {
        self.snapshot.read().await.tenant.clone()
    }

    /// Replaces both tokens in one step.
    ///
    /// The in-memory pair only changes once the backend accepted the write.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails; the previous pair stays.
    pub async fn save_credentials(&self, credentials: CredentialPair) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.write().await;
        self.backend
            .set_many(&[
                (ACCESS_TOKEN_KEY, credentials.access_token.clone()),
                (REFRESH_TOKEN_KEY, credentials.refresh_token.clone()),
            ])
            .await?;
        snapshot.credentials = Some(credentials);
        Ok(())
    }

    /// Stores everything returned by login or registration.
    ///
    /// # Errors
    ///
    /// Returns an error if a profile cannot be serialized or the write fails.
    pub async fn save_session(&self, session: &AuthSession) -> Result<(), StoreError> {
        let mut entries = vec![
            (ACCESS_TOKEN_KEY, session.tokens.access_token.clone()),
            (REFRESH_TOKEN_KEY, session.tokens.refresh_token.clone()),
            (USER_KEY, encode_profile(&session.user)?),
        ];
        if let Some(tenant) = &session.tenant {
            entries.push((TENANT_KEY, encode_profile(tenant)?));
        }

        let mut snapshot = self.snapshot.write().await;
        self.backend.set_many(&entries).await?;
        if session.tenant.is_none() {
            self.backend.remove(TENANT_KEY).await?;
        }
        *snapshot = Snapshot {
            credentials: Some(session.tokens.clone()),
            user: Some(session.user.clone()),
            tenant: session.tenant.clone(),
        };
        Ok(())
    }

    /// Replaces the cached profiles, keeping the tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if a profile cannot be serialized or the write fails.
    pub async fn save_profile(
        &self,
        user: &UserProfile,
        tenant: Option<&TenantProfile>,
    ) -> Result<(), StoreError> {
        let mut entries = vec![(USER_KEY, encode_profile(user)?)];
        if let Some(tenant) = tenant {
            entries.push((TENANT_KEY, encode_profile(tenant)?));
        }

        let mut snapshot = self.snapshot.write().await;
        self.backend.set_many(&entries).await?;
        if tenant.is_none() {
            self.backend.remove(TENANT_KEY).await?;
        }
        snapshot.user = Some(user.clone());
        snapshot.tenant = tenant.cloned();
        Ok(())
    }

    /// Forgets tokens and profiles.
    ///
    /// The in-memory snapshot is cleared even if the backend fails, so the
    /// process stops sending the old credentials either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not remove the entries.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.write().await;
        *snapshot = Snapshot::default();
        self.backend.remove_many(&ALL_KEYS).await
    }
}

fn encode_profile<T: serde::Serialize>(profile: &T) -> Result<String, StoreError> {
    serde_json::to_string(profile).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_profile<T: serde::de::DeserializeOwned>(raw: Option<String>, key: &str) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable cached profile");
            None
        }
    }
}
