//! gemquiz-store: Durable key-value storage and configuration.
//!
//! Implements the `KeyValueStore` contract from `gemquiz-core` on top of a
//! data directory, adds change notifications for observers, and loads the
//! user's `gemquiz.toml`.

pub mod config;
pub mod file;
pub mod watched;

pub use config::{load_config, load_config_from, GemquizConfig};
pub use file::FileStore;
pub use watched::{StoreChange, WatchedStore};
