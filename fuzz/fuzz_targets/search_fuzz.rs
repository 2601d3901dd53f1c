//! Fuzz test for free-text search and relevance scoring
//!
//! Feeds arbitrary text through the search stage and the full pipeline to
//! find panics on unusual Unicode (case folding that changes byte length,
//! combining marks, empty keywords).
//!
//! Run with: cargo +nightly fuzz run search_fuzz -- -max_total_time=60

#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use shopfront_core::{FilterCriteria, PageRequest, Product, QuerySignature, SearchQuery, SortKey};
use shopfront_query::{relevance_score, run_pipeline, search};

fn catalogue(text: &str) -> Vec<Product> {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    vec![
        Product::new("p1", "Gold Ring", "bijoux", 20.0, created_at),
        Product::new("p2", text, "bags", 40.0, created_at).with_description(text),
        Product::new("p3", "İstanbul Scarf", "accessories", 15.0, created_at)
            .with_subcategory(text),
    ]
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let products = catalogue(input);
        let query = SearchQuery::new(input);

        // Search never returns more than it was given
        let found = search(&products, &query, 2);
        assert!(found.len() <= products.len());

        for product in &products {
            let _ = relevance_score(product, input);
        }

        // The full pipeline only fails on malformed records, and these are not
        let criteria = FilterCriteria::default();
        for sort in SortKey::ALL {
            let signature = QuerySignature::new(&criteria, &query, sort, PageRequest::new(1, 2));
            let result = run_pipeline(&products, &signature, 2).expect("well-formed catalogue");
            assert!(result.page.len() <= 2);
            assert_eq!(result.total, result.items.len());
        }
    }
});
