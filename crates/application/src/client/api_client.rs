//! HTTP client wrapper that carries the session.

use std::sync::Arc;
use std::time::Duration;

use agenda_domain::{
    ApiRequest, ApiResponse, HttpMethod, Notification, SessionTrigger, messages,
};
use serde_json::Value;

use super::Disposition;
use crate::auth::{ForcedLogout, RefreshCoordinator, TokenStore};
use crate::error::{ApplicationError, ApplicationResult};
use crate::events::EventBus;
use crate::ports::{Clock, HttpClient};

struct Inner {
    http: Arc<dyn HttpClient>,
    tokens: TokenStore,
    events: EventBus,
    refresh: Arc<RefreshCoordinator>,
    forced_logout: Arc<ForcedLogout>,
}

/// Sends requests with the current access token and recovers from expiry.
///
/// Every request gets `Authorization: Bearer <token>` when a token is
/// stored. A 401 carrying the expiry marker is refreshed once, shared with
/// any other request failing at the same time, and the request is replayed
/// with the new token. Any other failure publishes a user-facing message on
/// the [`EventBus`] and is returned to the caller.
///
/// Cloning is cheap.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("refresh", &self.inner.refresh)
            .field("forced_logout", &self.inner.forced_logout)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Wires a client around `http`.
    ///
    /// `logout_grace` is the delay between the session-expired warning and
    /// the sign-out.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpClient>,
        tokens: TokenStore,
        events: EventBus,
        clock: Arc<dyn Clock>,
        logout_grace: Duration,
    ) -> Self {
        let forced_logout = Arc::new(ForcedLogout::new(
            tokens.clone(),
            events.clone(),
            clock,
            logout_grace,
        ));
        let refresh = Arc::new(RefreshCoordinator::new(
            Arc::clone(&http),
            tokens.clone(),
            events.clone(),
            Arc::clone(&forced_logout),
        ));
        Self {
            inner: Arc::new(Inner {
                http,
                tokens,
                events,
                refresh,
                forced_logout,
            }),
        }
    }

    /// Credential store shared with the pipeline.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Event bus the pipeline publishes on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Pending sign-out timer.
    #[must_use]
    pub fn forced_logout(&self) -> &ForcedLogout {
        &self.inner.forced_logout
    }

    /// Sends `request` through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the transport failure, the refresh failure or the
    /// non-success response mapped to an [`ApplicationError`].
    pub async fn send(&self, request: ApiRequest) -> ApplicationResult<ApiResponse> {
        let mut request = self.authorize(request).await;

        loop {
            let response = self.dispatch(&request).await?;

            match Disposition::of(&request, &response) {
                Disposition::Deliver => {
                    self.announce(&request, &response);
                    return Ok(response);
                }
                Disposition::Refresh => {
                    let token = self
                        .inner
                        .refresh
                        .fresh_access_token(request.bearer_token())
                        .await?;
                    tracing::debug!(request_id = %request.id, path = %request.path, "replaying request");
                    request = request.retried().authorized(&token);
                }
                Disposition::ForceLogout => {
                    tracing::warn!(path = %request.path, "credentials rejected");
                    self.inner.events.transition(SessionTrigger::CredentialsRejected);
                    self.inner.forced_logout.schedule();
                    return Err(ApplicationError::Unauthorized);
                }
                Disposition::Fail { notify } => {
                    let error = status_error(&response);
                    if notify {
                        self.inner
                            .events
                            .notify(Notification::error(error.user_message()));
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Sends `request` and parses the body as JSON. An empty body is `null`.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`ApplicationError::Serialization`]
    /// for a body that is not JSON.
    pub async fn send_json(&self, request: ApiRequest) -> ApplicationResult<Value> {
        let response = self.send(request).await?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(response.json()?)
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`send_json`](Self::send_json).
    pub async fn get(&self, path: &str) -> ApplicationResult<Value> {
        self.send_json(ApiRequest::get(path)?).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send_json`](Self::send_json).
    pub async fn post(&self, path: &str, body: Value) -> ApplicationResult<Value> {
        self.send_json(ApiRequest::post(path, body)?).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send_json`](Self::send_json).
    pub async fn put(&self, path: &str, body: Value) -> ApplicationResult<Value> {
        self.send_json(ApiRequest::new(HttpMethod::Put, path)?.with_body(body))
            .await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send_json`](Self::send_json).
    pub async fn patch(&self, path: &str, body: Value) -> ApplicationResult<Value> {
        self.send_json(ApiRequest::new(HttpMethod::Patch, path)?.with_body(body))
            .await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`send_json`](Self::send_json).
    pub async fn delete(&self, path: &str) -> ApplicationResult<Value> {
        self.send_json(ApiRequest::new(HttpMethod::Delete, path)?)
            .await
    }

    async fn authorize(&self, request: ApiRequest) -> ApiRequest {
        match self.inner.tokens.access_token().await {
            Some(token) => request.authorized(&token),
            None => request,
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> ApplicationResult<ApiResponse> {
        tracing::debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            attempt = request.attempt(),
            "sending request"
        );

        match self.inner.http.execute(request).await {
            Ok(response) => {
                tracing::debug!(
                    request_id = %request.id,
                    status = response.status,
                    elapsed_ms = response.duration.as_millis(),
                    "response received"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(request_id = %request.id, path = %request.path, error = %e, "no response");
                let error = ApplicationError::from(e);
                if !request.is_auth_boundary() {
                    self.inner
                        .events
                        .notify(Notification::error(error.user_message()));
                }
                Err(error)
            }
        }
    }

    fn announce(&self, request: &ApiRequest, response: &ApiResponse) {
        if request.is_auth_boundary() {
            return;
        }
        if let Some(message) = response.message() {
            self.inner.events.notify(Notification::success(message));
        }
    }
}

fn status_error(response: &ApiResponse) -> ApplicationError {
    let body = response.error_body();
    ApplicationError::Status {
        status: response.status,
        message: messages::error_message(response.status, &body),
        code: body.code,
        body: response.body.clone(),
    }
}
