//! CRUD passthrough for the business resources.
//!
//! Payloads are handed over as JSON and returned as the server sent them.

use agenda_domain::{ApiRequest, HttpMethod, Resource};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApplicationResult;

/// Generic access to clients, appointments, packages, transactions and schedules.
#[derive(Debug, Clone)]
pub struct ResourceApi {
    client: ApiClient,
}

impl ResourceApi {
    /// Creates a new `ResourceApi` on top of `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists a collection, with optional query filters.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn list(
        &self,
        resource: Resource,
        filters: &[(&str, &str)],
    ) -> ApplicationResult<Value> {
        let request = filters
            .iter()
            .fold(ApiRequest::get(resource.path())?, |request, (name, value)| {
                request.with_query(*name, *value)
            });
        self.client.send_json(request).await
    }

    /// Fetches one item.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn get(&self, resource: Resource, id: &str) -> ApplicationResult<Value> {
        self.client.get(&resource.item_path(id)).await
    }

    /// Creates an item.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn create(&self, resource: Resource, payload: Value) -> ApplicationResult<Value> {
        self.client.post(resource.path(), payload).await
    }

    /// Replaces an item.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: Value,
    ) -> ApplicationResult<Value> {
        self.client.put(&resource.item_path(id), payload).await
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn patch(
        &self,
        resource: Resource,
        id: &str,
        payload: Value,
    ) -> ApplicationResult<Value> {
        self.client.patch(&resource.item_path(id), payload).await
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn delete(&self, resource: Resource, id: &str) -> ApplicationResult<Value> {
        self.client
            .send_json(ApiRequest::new(HttpMethod::Delete, resource.item_path(id))?)
            .await
    }
}
