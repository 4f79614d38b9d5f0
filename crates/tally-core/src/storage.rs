use std::{
    collections::BTreeMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::CoreError;

pub const GOALS_KEY: &str = "goals";
pub const TRANSACTIONS_KEY: &str = "transactions";
pub const CATEGORIES_KEY: &str = "categories";
pub const USER_SETUP_KEY: &str = "user_setup";

/// Loads slower than this are reported.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Key-value persistence of JSON blobs.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&self, key: &str) -> Result<(), CoreError>;
    fn keys(&self) -> Result<Vec<String>, CoreError>;
}

/// Process-local [`BlobStore`], used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}

/// Reads a JSON array blob. A missing key yields an empty list.
pub fn load_records<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Vec<T>, CoreError> {
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Vec::new()),
    }
}

/// Reads a JSON array blob, degrading to an empty list on any failure.
pub fn load_records_or_default<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
    timeout: Duration,
) -> Vec<T> {
    let started = Instant::now();
    let records = match load_records(store, key) {
        Ok(records) => records,
        Err(err) => {
            warn!(key, error = %err, "failed to load records, using empty list");
            Vec::new()
        }
    };
    report_slow_load(key, started, timeout);
    debug!(key, count = records.len(), "loaded records");
    records
}

pub fn save_records<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    records: &[T],
) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(records)?;
    store.put(key, &json)
}

/// Reads a single JSON object blob.
pub fn load_document<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Option<T>, CoreError> {
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

pub fn save_document<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    document: &T,
) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(document)?;
    store.put(key, &json)
}

pub(crate) fn report_slow_load(key: &str, started: Instant, timeout: Duration) {
    let elapsed = started.elapsed();
    if elapsed > timeout {
        warn!(
            key,
            elapsed_ms = elapsed.as_millis() as u64,
            timeout_ms = timeout.as_millis() as u64,
            "load exceeded timeout"
        );
    }
}
