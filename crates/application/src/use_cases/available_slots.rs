//! Availability grid lookup.

use agenda_domain::{ApiRequest, SlotQuery};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApplicationResult;

/// Use case for `GET /schedules/available-slots`.
#[derive(Debug, Clone)]
pub struct GetAvailableSlots {
    client: ApiClient,
}

impl GetAvailableSlots {
    /// Creates a new `GetAvailableSlots` use case.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches the free slots for the given day and filters.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error of the call.
    pub async fn execute(&self, query: &SlotQuery) -> ApplicationResult<Value> {
        let request = query
            .query_pairs()
            .into_iter()
            .fold(ApiRequest::get(SlotQuery::PATH)?, |request, (name, value)| {
                request.with_query(name, value)
            });
        self.client.send_json(request).await
    }
}
