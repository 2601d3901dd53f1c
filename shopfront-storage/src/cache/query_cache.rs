//! Bounded FIFO cache of query results.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use shopfront_core::Timestamp;

use super::key::CacheKey;
use super::stats::CacheStats;

/// A memoized value and when it was inserted.
#[derive(Debug)]
pub struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: Timestamp,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            inserted_at: self.inserted_at,
        }
    }
}

impl<V> CacheEntry<V> {
    pub fn value(&self) -> Arc<V> {
        Arc::clone(&self.value)
    }

    pub fn inserted_at(&self) -> Timestamp {
        self.inserted_at
    }
}

/// Query result cache with a fixed capacity and FIFO eviction.
///
/// Both `get` and `put` are O(1). Re-inserting an existing key replaces its
/// value but keeps its original position in the eviction queue.
#[derive(Debug)]
pub struct QueryCache<V> {
    capacity: usize,
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// Keys in insertion order, oldest at the front.
    order: VecDeque<CacheKey>,
    stats: CacheStats,
}

impl<V> QueryCache<V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: `put` stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up an entry, recording a hit or a miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<CacheEntry<V>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.hits += 1;
                Some(entry.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up an entry without touching the statistics.
    pub fn peek(&self, key: &CacheKey) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Insert a value, evicting the oldest entry if the cache is full.
    ///
    /// Returns the evicted key, if any.
    pub fn put(&mut self, key: CacheKey, value: V) -> Option<CacheKey> {
        self.put_arc(key, Arc::new(value))
    }

    /// Same as [`QueryCache::put`] for a value that is already shared.
    pub fn put_arc(&mut self, key: CacheKey, value: Arc<V>) -> Option<CacheKey> {
        if self.capacity == 0 {
            return None;
        }

        let entry = CacheEntry {
            value,
            inserted_at: Utc::now(),
        };

        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
        self.stats.entry_count = self.entries.len() as u64;
        evicted
    }

    fn evict_oldest(&mut self) -> Option<CacheKey> {
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        self.stats.evictions += 1;
        tracing::debug!(key = %oldest, "Evicted oldest query result");
        Some(oldest)
    }

    /// Drop every entry. Statistics other than the entry count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.entry_count = 0;
    }

    /// Keys in insertion order, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}
