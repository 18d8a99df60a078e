//! Fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use agenda_domain::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::ports::{Clock, HttpClient, HttpClientError, HttpFuture, KeyValueStore, StoreError};

/// In-memory store that can be told to fail writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        store.entries.lock().extend(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock() = true;
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        if *self.fail_writes.lock() {
            return Err(StoreError::Io("disk full".to_string()));
        }
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

type Handler = dyn Fn(ApiRequest) -> Pin<Box<dyn Future<Output = Result<ApiResponse, HttpClientError>> + Send>>
    + Send
    + Sync;

/// HTTP client answering from a closure and recording every request.
pub struct ScriptedHttpClient {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl ScriptedHttpClient {
    pub fn new<F, Fut>(handler: F) -> Arc<Self>
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiResponse, HttpClientError>> + Send + 'static,
    {
        Arc::new(Self {
            handler: Box::new(move |request| Box::pin(handler(request))),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Requests sent to `path`, in dispatch order.
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute(&self, request: &ApiRequest) -> HttpFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        (self.handler)(request.clone())
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(
            Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
