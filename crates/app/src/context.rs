//! Wiring of adapters and services.

use std::sync::Arc;

use agenda_application::ports::KeyValueStore;
use agenda_application::{
    ApiClient, AuthService, EventBus, GetAvailableSlots, ResourceApi, TokenStore,
};
use agenda_domain::{ClientSettings, SessionState};
use agenda_infrastructure::{
    FileKeyValueStore, InMemoryKeyValueStore, ReqwestHttpClient, SystemClock,
};

/// Everything a command needs.
pub struct AppContext {
    pub client: ApiClient,
    pub auth: AuthService,
    pub resources: ResourceApi,
    pub slots: GetAvailableSlots,
}

impl AppContext {
    /// Builds the services for `settings`, restoring any stored session.
    pub async fn build(settings: &ClientSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let backend: Arc<dyn KeyValueStore> = match &settings.storage_path {
            Some(path) => Arc::new(FileKeyValueStore::new(path)),
            None => {
                tracing::debug!("no storage path configured, session kept in memory");
                Arc::new(InMemoryKeyValueStore::new())
            }
        };
        let tokens = TokenStore::load(backend).await?;

        let initial = if tokens.has_credentials().await {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };

        let client = ApiClient::new(
            Arc::new(ReqwestHttpClient::new(settings)?),
            tokens,
            EventBus::new(initial),
            Arc::new(SystemClock::new()),
            settings.logout_grace(),
        );

        Ok(Self {
            auth: AuthService::new(client.clone()),
            resources: ResourceApi::new(client.clone()),
            slots: GetAvailableSlots::new(client.clone()),
            client,
        })
    }
}
