//! Authenticated request pipeline.

mod api_client;
mod disposition;

#[cfg(test)]
mod scenarios;

pub use api_client::ApiClient;
pub use disposition::Disposition;
