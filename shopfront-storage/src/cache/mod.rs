//! Query result cache.
//!
//! Results are memoized per exact query signature and evicted in insertion
//! order once the bound is reached. Eviction is FIFO, not LRU: a hit does not
//! refresh an entry's position, so eviction never needs an access-order
//! structure.
//!
//! # Example
//!
//! ```ignore
//! let key = CacheKey::from_signature(&signature);
//! if let Some(entry) = cache.get(&key) {
//!     return entry.value();
//! }
//! let result = run_pipeline(...)?;
//! cache.put(key, result);
//! ```

pub mod key;
pub mod query_cache;
pub mod stats;

pub use key::CacheKey;
pub use query_cache::{CacheEntry, QueryCache};
pub use stats::CacheStats;
