//! Key-value persistence.
//!
//! The engine only needs string keys and string values (the browser
//! local-storage model). Backends:
//!
//! - [`InMemoryKeyValueStore`]: process-local map, used in tests and for
//!   ephemeral sessions
//! - [`JsonFileStore`]: a single JSON object on disk
//! - [`LmdbKeyValueStore`]: an LMDB environment via `heed`

pub mod file;
pub mod lmdb;
pub mod memory;

pub use file::{FileStoreError, JsonFileStore};
pub use lmdb::{LmdbKeyValueStore, LmdbStoreError};
pub use memory::InMemoryKeyValueStore;

use shopfront_core::ShopfrontResult;
use std::sync::Arc;

/// String key-value store.
///
/// Implementations must be thread-safe. `get` on a missing key returns
/// `Ok(None)`; `remove` on a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> ShopfrontResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> ShopfrontResult<()>;

    /// Delete `key`.
    fn remove(&self, key: &str) -> ShopfrontResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> ShopfrontResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ShopfrontResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> ShopfrontResult<()> {
        (**self).remove(key)
    }
}
