//! Single-flight access token refresh.
//!
//! Every request that fails with an expired access token asks the
//! [`RefreshCoordinator`] for a fresh one. The first caller of an episode
//! starts the refresh call; everyone else subscribes and is handed the same
//! outcome, in the order they subscribed.

use std::sync::Arc;

use agenda_domain::{ApiRequest, CredentialPair, RefreshRequest, SessionTrigger, TokenEnvelope};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{ForcedLogout, TokenStore};
use crate::error::{ApplicationError, ApplicationResult};
use crate::events::EventBus;
use crate::ports::HttpClient;

/// Path of the refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

type Subscriber = oneshot::Sender<ApplicationResult<CredentialPair>>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    subscribers: Vec<Subscriber>,
}

/// Coordinates token refreshes so that at most one is in flight.
pub struct RefreshCoordinator {
    http: Arc<dyn HttpClient>,
    tokens: TokenStore,
    events: EventBus,
    forced_logout: Arc<ForcedLogout>,
    state: Mutex<RefreshState>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RefreshCoordinator")
            .field("in_flight", &state.in_flight)
            .field("subscribers", &state.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Creates a coordinator refreshing through `http`.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpClient>,
        tokens: TokenStore,
        events: EventBus,
        forced_logout: Arc<ForcedLogout>,
    ) -> Self {
        Self {
            http,
            tokens,
            events,
            forced_logout,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Returns true while a refresh call is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    /// Returns an access token that replaces `rejected`.
    ///
    /// `rejected` is the token the failing request carried. If the store
    /// already holds a different one, it is returned without refreshing.
    /// Otherwise the caller joins the in-flight refresh, starting it if
    /// there is none. No refresh is started while a forced logout is
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns the refresh failure, or [`ApplicationError::SessionExpired`]
    /// while the session is being signed out.
    pub async fn fresh_access_token(
        self: &Arc<Self>,
        rejected: Option<&str>,
    ) -> ApplicationResult<String> {
        if let Some(current) = self.tokens.access_token().await
            && Some(current.as_str()) != rejected
        {
            tracing::debug!("access token already replaced, skipping refresh");
            return Ok(current);
        }

        let (tx, rx) = oneshot::channel();
        let lead = {
            let mut state = self.state.lock();
            if !state.in_flight && self.forced_logout.is_pending() {
                tracing::debug!("sign out pending, not refreshing");
                return Err(ApplicationError::SessionExpired(
                    "session expired, signing out".to_string(),
                ));
            }
            state.subscribers.push(tx);
            if state.in_flight {
                tracing::debug!(
                    queued = state.subscribers.len(),
                    "waiting for in-flight refresh"
                );
                false
            } else {
                state.in_flight = true;
                true
            }
        };

        if lead {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.run().await });
        }

        match rx.await {
            Ok(outcome) => outcome.map(|pair| pair.access_token),
            Err(_) => Err(ApplicationError::SessionExpired(
                "refresh was abandoned".to_string(),
            )),
        }
    }

    async fn run(&self) {
        tracing::info!("access token expired, refreshing");
        self.events.transition(SessionTrigger::RefreshStarted);

        let outcome = self.refresh().await;

        // The timer must be pending before the flag drops.
        if outcome.is_err() {
            self.events.transition(SessionTrigger::RefreshFailed);
            self.forced_logout.schedule();
        }

        let subscribers = {
            let mut state = self.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.subscribers)
        };

        match &outcome {
            Ok(_) => {
                tracing::info!(waiting = subscribers.len(), "token refresh succeeded");
                self.events.transition(SessionTrigger::RefreshSucceeded);
            }
            Err(e) => {
                tracing::warn!(error = %e, waiting = subscribers.len(), "token refresh failed");
            }
        }

        for subscriber in subscribers {
            let _ = subscriber.send(outcome.clone());
        }
    }

    async fn refresh(&self) -> ApplicationResult<CredentialPair> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .await
            .ok_or(ApplicationError::NotAuthenticated)?;

        let body = serde_json::to_value(RefreshRequest { refresh_token })?;
        let request = ApiRequest::post(REFRESH_PATH, body)?;
        let response = self.http.execute(&request).await?;

        if !response.is_success() {
            let error = response.error_body();
            return Err(ApplicationError::SessionExpired(
                error
                    .message
                    .or(error.code)
                    .unwrap_or_else(|| format!("refresh rejected with status {}", response.status)),
            ));
        }

        let envelope: TokenEnvelope = response.json()?;
        self.tokens.save_credentials(envelope.tokens.clone()).await?;
        Ok(envelope.tokens)
    }
}
