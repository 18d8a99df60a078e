//! Outgoing request descriptors

mod api_request;
mod header;
mod method;

pub use api_request::{AUTH_BOUNDARY_PREFIX, ApiRequest};
pub use header::{Header, Headers};
pub use method::HttpMethod;
