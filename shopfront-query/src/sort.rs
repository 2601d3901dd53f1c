//! Sort comparator.

use std::cmp::{Ordering, Reverse};

use shopfront_core::{Product, SortKey};

use crate::search::relevance_score;

/// Return a new list ordered by `key`. The input is left untouched.
///
/// Every key sorts stably, so products that compare equal keep their
/// relative order. `term` is the effective search term, used only by
/// [`SortKey::Relevance`]; without one, relevance keeps input order.
pub fn sort_products<'a>(products: &[&'a Product], key: SortKey, term: Option<&str>) -> Vec<&'a Product> {
    let mut sorted = products.to_vec();
    match key {
        SortKey::Relevance => {
            if let Some(term) = term {
                // Score once per product; slice::sort_by_cached_key is stable.
                sorted.sort_by_cached_key(|p| Reverse(relevance_score(p, term)));
            }
        }
        _ => sorted.sort_by(|a, b| compare(a, b, key)),
    }
    sorted
}

/// Comparator for every key except relevance, which needs a search term.
pub fn compare(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::Relevance => Ordering::Equal,
        SortKey::PriceAsc => a.price.total_cmp(&b.price),
        SortKey::PriceDesc => b.price.total_cmp(&a.price),
        SortKey::RatingDesc => b.rating.total_cmp(&a.rating),
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::NameAsc => a
            .name
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.name.chars().flat_map(char::to_lowercase)),
        SortKey::Featured => b.featured().cmp(&a.featured()),
    }
}
