//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;
mod key_value_store;

pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError, HttpFuture};
pub use key_value_store::{KeyValueStore, StoreError};
