//! Change notifications over any store.

use tokio::sync::broadcast;

use gemquiz_core::error::StoreError;
use gemquiz_core::storage::KeyValueStore;

/// A successful write observed through a [`WatchedStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Set { key: String },
    Removed { key: String },
}

impl StoreChange {
    pub fn key(&self) -> &str {
        match self {
            StoreChange::Set { key } | StoreChange::Removed { key } => key,
        }
    }
}

/// Wraps a store and broadcasts every successful `set`/`remove`.
///
/// Failed writes are not broadcast. Slow receivers may observe
/// `RecvError::Lagged` and should re-read the keys they care about.
pub struct WatchedStore<S> {
    inner: S,
    changes: broadcast::Sender<StoreChange>,
}

impl<S: KeyValueStore> WatchedStore<S> {
    pub fn new(inner: S) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self { inner, changes }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn notify(&self, change: StoreChange) {
        // No receivers is fine.
        let _ = self.changes.send(change);
    }
}

impl<S: KeyValueStore> KeyValueStore for WatchedStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)?;
        self.notify(StoreChange::Set {
            key: key.to_string(),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)?;
        self.notify(StoreChange::Removed {
            key: key.to_string(),
        });
        Ok(())
    }
}
