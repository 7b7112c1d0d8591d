//! Storage error types.
//!
//! Session controllers never surface these to their callers; they are logged
//! and swallowed so an in-memory session keeps running when persistence fails.

use thiserror::Error;

/// Errors that can occur when reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key contains characters the backend cannot address.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend failed to read or write.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend is unavailable (poisoned lock, closed handle, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` if retrying the same operation cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidKey(_) | StoreError::Serialization(_)
        )
    }
}
