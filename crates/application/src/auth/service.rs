//! Calls to the `/auth` endpoints.

use agenda_domain::{
    ApiRequest, AuthSession, LoginRequest, ProfileSnapshot, RegisterRequest, SessionTrigger,
    TenantProfile, UserProfile,
};
use serde_json::json;

use crate::client::ApiClient;
use crate::error::{ApplicationError, ApplicationResult};

/// Login, registration, logout and profile lookups.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Creates a service sending through `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Signs in and stores the returned session.
    ///
    /// # Errors
    ///
    /// Returns the API error unchanged; no notification is published.
    pub async fn login(&self, email: &str, password: &str) -> ApplicationResult<AuthSession> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let session: AuthSession = self
            .client
            .send(ApiRequest::post("/auth/login", body)?)
            .await?
            .json()?;
        self.establish(&session).await?;
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    /// Creates an account and stores the returned session.
    ///
    /// # Errors
    ///
    /// Returns the API error unchanged; no notification is published.
    pub async fn register(&self, payload: RegisterRequest) -> ApplicationResult<AuthSession> {
        let body = serde_json::to_value(&payload)?;
        let session: AuthSession = self
            .client
            .send(ApiRequest::post("/auth/register", body)?)
            .await?
            .json()?;
        self.establish(&session).await?;
        tracing::info!(user_id = %session.user.id, "account registered");
        Ok(session)
    }

    /// Signs out. Local state is cleared whatever the server says.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local credentials could not be removed.
    pub async fn logout(&self) -> ApplicationResult<()> {
        let tokens = self.client.tokens();
        if let Some(refresh_token) = tokens.refresh_token().await {
            let request = ApiRequest::post("/auth/logout", json!({ "refreshToken": refresh_token }))?;
            if let Err(e) = self.client.send(request).await {
                tracing::debug!(error = %e, "server-side logout failed, clearing locally");
            }
        }

        self.client.forced_logout().cancel().await;
        tokens.clear().await?;
        self.client.events().transition(SessionTrigger::LoggedOut);
        tracing::info!("signed out");
        Ok(())
    }

    /// Fetches the current profile and refreshes the cache.
    ///
    /// # Errors
    ///
    /// Returns the API error unchanged.
    pub async fn me(&self) -> ApplicationResult<ProfileSnapshot> {
        let snapshot: ProfileSnapshot = self
            .client
            .send(ApiRequest::get("/auth/me")?)
            .await?
            .json()?;
        self.client
            .tokens()
            .save_profile(&snapshot.user, snapshot.tenant.as_ref())
            .await?;
        Ok(snapshot)
    }

    /// Validates stored credentials from a previous run.
    ///
    /// Returns `None` when nothing was stored or the server rejected it, in
    /// which case the local state is cleared.
    ///
    /// # Errors
    ///
    /// Returns transport failures, so an offline start keeps the credentials.
    pub async fn restore_session(&self) -> ApplicationResult<Option<ProfileSnapshot>> {
        if !self.client.tokens().has_credentials().await {
            return Ok(None);
        }

        match self.me().await {
            Ok(snapshot) => {
                self.client.events().transition(SessionTrigger::LoggedIn);
                Ok(Some(snapshot))
            }
            Err(e @ (ApplicationError::Timeout { .. } | ApplicationError::Unreachable(_))) => Err(e),
            Err(e) => {
                tracing::info!(error = %e, "stored session rejected");
                self.client.tokens().clear().await?;
                self.client.events().transition(SessionTrigger::LoggedOut);
                Ok(None)
            }
        }
    }

    /// Cached user profile.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.client.tokens().user().await
    }

    /// Cached tenant profile.
    pub async fn current_tenant(&self) -> Option<TenantProfile> {
        self.client.tokens().tenant().await
    }

    async fn establish(&self, session: &AuthSession) -> ApplicationResult<()> {
        self.client.forced_logout().cancel().await;
        self.client.tokens().save_session(session).await?;
        self.client.events().transition(SessionTrigger::LoggedIn);
        Ok(())
    }
}
