//! JSON file backend.
//!
//! All entries live in one file:
//! ```json
//! {
//!   "accessToken": "...",
//!   "refreshToken": "...",
//!   "tenant": "{\"id\":\"t1\"}",
//!   "user": "{\"id\":\"u1\"}"
//! }
//! ```
//! Every write replaces the file through a temp file and a rename, so a
//! crash leaves either the old or the new content.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agenda_application::ports::{KeyValueStore, StoreError};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Entries = BTreeMap<String, String>;

/// File-backed key-value store.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Creates a store persisting to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => {
                from_json_bytes(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }

        let content =
            to_json_stable_bytes(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, &content)
            .await
            .map_err(|e| io_error(&temp, &e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, &e))?;

        tracing::trace!(path = %self.path.display(), keys = entries.len(), "credential file written");
        Ok(())
    }
}

fn io_error(path: &Path, error: &std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {error}", path.display()))
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_entries().await?;
        for (key, value) in entries {
            current.insert((*key).to_string(), value.clone());
        }
        self.write_entries(&current).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut current = self.read_entries().await?;
        let before = current.len();
        for key in keys {
            current.remove(*key);
        }
        if current.len() == before {
            return Ok(());
        }
        self.write_entries(&current).await
    }
}
