//! Browser-style local key/value persistence.
//!
//! The bridge and the identity provider only need `get/set/remove` over string
//! keys, the same surface `localStorage` offers a web client. Values are opaque
//! strings; callers own their serialization.

mod fallback;
mod file;
mod memory;

pub use fallback::{FallbackStore, FALLBACK_USER_KEY};
pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key/value store with local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, `None` when the key is absent.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Inserts or replaces the value for `key`.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`; removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
