//! Fuzz test for persisted search history parsing
//!
//! The stored value comes from an external key-value store and may be
//! anything. Loading must never panic and must always yield a bounded,
//! trimmed, duplicate-free list.
//!
//! Run with: cargo +nightly fuzz run history_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use shopfront_storage::SearchHistory;
use std::collections::HashSet;

const LIMIT: usize = 10;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(terms) = SearchHistory::parse_persisted(raw, LIMIT) {
            assert!(terms.len() <= LIMIT);

            let mut seen = HashSet::new();
            for term in &terms {
                assert!(!term.is_empty(), "blank terms are dropped");
                assert_eq!(term.trim(), term, "terms are trimmed");
                assert!(seen.insert(term.as_str()), "terms are distinct");
            }
        }
    }
});
