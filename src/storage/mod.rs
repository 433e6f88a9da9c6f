//! Durable client-side key-value storage.
//!
//! Values are opaque strings (callers store JSON). Every call is synchronous
//! and exclusive, so a read-modify-write never interleaves with another one.

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized filter criteria.
pub const FILTERS_KEY: &str = "deviceFilters";
/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the serialized user record.
pub const USER_KEY: &str = "user";

/// Errors that can occur while reading or writing durable state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access state file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse state file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to lock state file '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A persistent string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
