//! SHOPFRONT Storage - Persistence and Memoization
//!
//! Defines the key-value store abstraction the engine persists to, the
//! search history kept in it, and the bounded query result cache.

pub mod cache;
pub mod history;
pub mod kv;

pub use cache::{CacheEntry, CacheKey, CacheStats, QueryCache};
pub use history::SearchHistory;
pub use kv::{
    FileStoreError, InMemoryKeyValueStore, JsonFileStore, KeyValueStore, LmdbKeyValueStore,
    LmdbStoreError,
};
