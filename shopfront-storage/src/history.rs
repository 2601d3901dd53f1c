//! Recent search terms, persisted to a key-value store.
//!
//! The history is an ordered list of distinct terms, most recent first,
//! bounded to a maximum length. It is stored as a JSON array of strings.
//! Persistence is best effort: a store that is missing, failing or holding
//! malformed JSON degrades to an empty history and a `warn!` log line, never
//! to an error returned to the caller.

use std::sync::Arc;

use crate::kv::KeyValueStore;

/// Bounded, deduplicated, most-recent-first search history.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    key: String,
    limit: usize,
    terms: Vec<String>,
}

impl SearchHistory {
    /// Load the history persisted under `key`, defaulting to empty.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, limit: usize) -> Self {
        let key = key.into();
        let terms = match store.get(&key) {
            Ok(Some(raw)) => match Self::parse_persisted(&raw, limit) {
                Ok(terms) => terms,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding malformed search history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Search history unavailable, starting empty");
                Vec::new()
            }
        };

        Self {
            store,
            key,
            limit,
            terms,
        }
    }

    /// Parse a persisted history value.
    ///
    /// Entries are trimmed, blanks and later duplicates are dropped, and the
    /// result is truncated to `limit`.
    pub fn parse_persisted(raw: &str, limit: usize) -> Result<Vec<String>, serde_json::Error> {
        let stored: Vec<String> = serde_json::from_str(raw)?;
        let mut terms: Vec<String> = Vec::with_capacity(stored.len().min(limit));
        for term in stored {
            let term = term.trim();
            if term.is_empty() || terms.iter().any(|t| t == term) {
                continue;
            }
            if terms.len() == limit {
                break;
            }
            terms.push(term.to_string());
        }
        Ok(terms)
    }

    /// Terms, most recent first.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Move `term` to the front, inserting it if new, then persist.
    pub fn record(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.terms.retain(|t| t != term);
        self.terms.insert(0, term.to_string());
        self.terms.truncate(self.limit);
        self.persist();
    }

    /// Remove a single term. Returns whether it was present.
    pub fn remove(&mut self, term: &str) -> bool {
        let term = term.trim();
        let before = self.terms.len();
        self.terms.retain(|t| t != term);
        let removed = self.terms.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Empty the history and persist the empty state.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.persist();
    }

    /// Recent terms starting with `prefix` (case-insensitive), most recent first.
    pub fn matching(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.trim().to_lowercase();
        self.terms
            .iter()
            .filter(|t| t.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    fn persist(&self) {
        let encoded = match serde_json::to_string(&self.terms) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to encode search history");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &encoded) {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist search history");
        }
    }
}

impl std::fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistory")
            .field("key", &self.key)
            .field("limit", &self.limit)
            .field("terms", &self.terms)
            .finish()
    }
}
