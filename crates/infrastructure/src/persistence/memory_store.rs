//! In-memory backend, used when no storage path is configured.

use std::collections::HashMap;

use agenda_application::ports::{KeyValueStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Process-local key-value store. Forgets everything on exit.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut map = self.entries.write();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.write();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        store.set("accessToken", "a1".to_string()).await.unwrap();
        assert_eq!(store.get("accessToken").await.unwrap().as_deref(), Some("a1"));

        store.remove("accessToken").await.unwrap();
        assert_eq!(store.get("accessToken").await.unwrap(), None);
    }
}
