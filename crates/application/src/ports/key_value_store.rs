//! Persistent key-value store port
//!
//! Backs the token store. Values are opaque strings; callers serialize.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository trait for string key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes several entries in one operation.
    ///
    /// Implementations must make the whole batch visible at once.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;

    /// Removes several keys in one operation. Missing keys are ignored.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Writes a single value.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.set_many(&[(key, value)]).await
    }

    /// Removes a single key.
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key]).await
    }
}
