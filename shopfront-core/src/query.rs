//! Search term, sort key, page request and the canonical query signature.

use crate::{FilterCriteria, QueryError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

// ============================================================================
// SEARCH QUERY
// ============================================================================

/// Free-text search input as typed by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trimmed term, if it is long enough to take effect.
    ///
    /// Length is counted in characters. Terms shorter than `min_len` (and
    /// blank terms) are a no-op rather than a search for nothing.
    pub fn effective_term(&self, min_len: usize) -> Option<&str> {
        let term = self.0.trim();
        if term.is_empty() || term.chars().count() < min_len {
            None
        } else {
            Some(term)
        }
    }

    pub fn is_active(&self, min_len: usize) -> bool {
        self.effective_term(min_len).is_some()
    }
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

// ============================================================================
// SORT KEY
// ============================================================================

/// Total order applied to the filtered products. Always applied stably.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Best search matches first; input order when there is no search term.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    RatingDesc,
    /// Most recently added first.
    Newest,
    NameAsc,
    /// Featured products first, input order otherwise.
    Featured,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Relevance,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::RatingDesc,
        SortKey::Newest,
        SortKey::NameAsc,
        SortKey::Featured,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::RatingDesc => "rating_desc",
            SortKey::Newest => "newest",
            SortKey::NameAsc => "name_asc",
            SortKey::Featured => "featured",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QueryError::UnknownSortKey { key: s.to_string() })
    }
}

// ============================================================================
// PAGE REQUEST
// ============================================================================

/// 1-indexed page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 {
            return Err(ValidationError::InvalidValue {
                field: "page_size".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Index of the first item on this page, or `None` for page 0.
    pub fn offset(&self) -> Option<usize> {
        self.page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(self.page_size))
    }

    /// Number of pages needed for `total` items. Never less than one.
    pub fn total_pages(&self, total: usize) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        total.div_ceil(self.page_size).max(1)
    }
}

// ============================================================================
// QUERY SIGNATURE
// ============================================================================

/// The full query tuple that identifies one memoized result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuerySignature<'a> {
    pub criteria: &'a FilterCriteria,
    pub query: &'a SearchQuery,
    pub sort: SortKey,
    pub page: PageRequest,
}

impl<'a> QuerySignature<'a> {
    pub fn new(
        criteria: &'a FilterCriteria,
        query: &'a SearchQuery,
        sort: SortKey,
        page: PageRequest,
    ) -> Self {
        Self {
            criteria,
            query,
            sort,
            page,
        }
    }

    /// Order-independent encoding of the tuple.
    ///
    /// Fields appear in a fixed alphabetical order, sets are already sorted,
    /// strings are length-prefixed and floats are written as their bit
    /// patterns, so two logically identical signatures always encode to the
    /// same string and any field difference changes it.
    pub fn canonical(&self) -> String {
        let c = self.criteria;
        let mut out = String::with_capacity(256);

        push_field(&mut out, "category", &opt_str(c.category.as_deref()));
        push_field(&mut out, "colors", &set_str(c.colors.iter()));
        push_field(&mut out, "featured", bool_str(c.featured));
        push_field(&mut out, "in_stock", bool_str(c.in_stock));
        push_field(&mut out, "max_price", &float_bits(c.price.max));
        push_field(&mut out, "min_price", &float_bits(c.price.min));
        push_field(&mut out, "min_rating", &float_bits(f64::from(c.min_rating)));
        push_field(&mut out, "on_sale", bool_str(c.on_sale));
        push_field(&mut out, "page", &self.page.page.to_string());
        push_field(&mut out, "page_size", &self.page.page_size.to_string());
        push_field(&mut out, "query", &len_prefixed(self.query.as_str()));
        push_field(&mut out, "sizes", &set_str(c.sizes.iter()));
        push_field(&mut out, "sort", self.sort.as_str());
        push_field(&mut out, "subcategory", &opt_str(c.subcategory.as_deref()));
        push_field(&mut out, "trending", bool_str(c.trending));

        out
    }
}

fn push_field(out: &mut String, name: &str, value: &str) {
    if !out.is_empty() {
        out.push(';');
    }
    out.push_str(name);
    out.push('=');
    out.push_str(value);
}

fn len_prefixed(s: &str) -> String {
    format!("{}:{}", s.len(), s)
}

fn opt_str(s: Option<&str>) -> String {
    match s {
        Some(s) => len_prefixed(s),
        None => "~".to_string(),
    }
}

fn set_str<'s>(items: impl Iterator<Item = &'s String>) -> String {
    let mut out = String::from("[");
    for item in items {
        out.push_str(&len_prefixed(item));
    }
    out.push(']');
    out
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

fn float_bits(f: f64) -> String {
    // -0.0 and 0.0 are the same bound
    let f = if f == 0.0 { 0.0 } else { f };
    let mut out = String::with_capacity(16);
    let _ = write!(out, "{:016x}", f.to_bits());
    out
}
