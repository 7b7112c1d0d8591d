//! Key-value persistence contract and the in-memory implementation.
//!
//! Sessions only need `get`/`set`/`remove` on string values under a few fixed
//! keys. Durable backends live in `gemquiz-store`.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::progress::UserProgress;

/// Key for a saved practice session.
pub const QUIZ_STATE_KEY: &str = "gemquiz-quiz-state";
/// Key for cumulative progress.
pub const PROGRESS_KEY: &str = "gemquiz-progress";
/// Key for a saved exam (state plus timer).
pub const EXAM_STATE_KEY: &str = "gemquiz-exam-state";

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store, for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        values.remove(key);
        Ok(())
    }
}

/// Read `key`, treating read failures as "nothing saved".
pub(crate) fn read_or_none(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, "failed to read saved data: {e}");
            None
        }
    }
}

/// Encode a value and write it under `key`, logging and swallowing failures.
///
/// Nothing is written when `encode` fails.
pub(crate) fn write_best_effort<F>(store: &dyn KeyValueStore, key: &str, encode: F)
where
    F: FnOnce() -> Result<String, StoreError>,
{
    if let Err(e) = encode().and_then(|json| store.set(key, &json)) {
        tracing::warn!(key, permanent = e.is_permanent(), "failed to persist: {e}");
    }
}

/// Remove `key`, logging and swallowing failures.
pub(crate) fn remove_best_effort(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        tracing::warn!(key, "failed to clear saved data: {e}");
    }
}

/// Load saved progress; missing or malformed data yields fresh progress.
pub fn load_progress(store: &dyn KeyValueStore) -> UserProgress {
    let Some(json) = read_or_none(store, PROGRESS_KEY) else {
        return UserProgress::default();
    };
    match serde_json::from_str(&json) {
        Ok(progress) => progress,
        Err(e) => {
            tracing::warn!("saved progress is unreadable, starting fresh: {e}");
            UserProgress::default()
        }
    }
}

/// Save progress (best effort).
pub fn save_progress(store: &dyn KeyValueStore, progress: &UserProgress) {
    write_best_effort(store, PROGRESS_KEY, || Ok(serde_json::to_string(progress)?));
}
