//! Free-text search.
//!
//! A keyword heuristic, not a full-text index: the effective term is
//! lower-cased and split on whitespace, and a product matches when every
//! keyword occurs somewhere in its name, description, category or
//! subcategory.

use shopfront_core::{Product, SearchQuery};

// Relevance weights
const EXACT_NAME: u32 = 200;
const NAME_CONTAINS_TERM: u32 = 100;
const NAME_KEYWORD: u32 = 20;
const CATEGORY_KEYWORD: u32 = 10;
const DESCRIPTION_KEYWORD: u32 = 5;

/// Lower-cased whitespace-separated keywords of a term.
pub fn keywords(term: &str) -> Vec<String> {
    term.split_whitespace().map(str::to_lowercase).collect()
}

/// Lower-cased text a product is searched by.
pub fn searchable_text(product: &Product) -> String {
    let mut text = String::with_capacity(
        product.name.len() + product.description.len() + product.category.len() + 16,
    );
    text.push_str(&product.name);
    text.push('\n');
    text.push_str(&product.description);
    text.push('\n');
    text.push_str(&product.category);
    if let Some(subcategory) = &product.subcategory {
        text.push('\n');
        text.push_str(subcategory);
    }
    text.to_lowercase()
}

/// Whether every keyword occurs in the product's searchable text.
pub fn matches_keywords(product: &Product, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let text = searchable_text(product);
    keywords.iter().all(|keyword| text.contains(keyword.as_str()))
}

/// Products matching the query, in input order.
///
/// A query below `min_len` characters is a no-op and returns every product.
pub fn search<'a>(products: &'a [Product], query: &SearchQuery, min_len: usize) -> Vec<&'a Product> {
    let Some(term) = query.effective_term(min_len) else {
        return products.iter().collect();
    };
    let keywords = keywords(term);
    products
        .iter()
        .filter(|product| matches_keywords(product, &keywords))
        .collect()
}

/// Score a product against a search term. Higher is more relevant.
pub fn relevance_score(product: &Product, term: &str) -> u32 {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return 0;
    }

    let name = product.name.to_lowercase();
    let category = product.category.to_lowercase();
    let subcategory = product.subcategory.as_deref().map(str::to_lowercase);
    let description = product.description.to_lowercase();

    let mut score = 0;
    if name == term {
        score += EXACT_NAME;
    } else if name.contains(&term) {
        score += NAME_CONTAINS_TERM;
    }

    for keyword in term.split_whitespace() {
        if name.contains(keyword) {
            score += NAME_KEYWORD;
        }
        if category.contains(keyword)
            || subcategory.as_deref().is_some_and(|s| s.contains(keyword))
        {
            score += CATEGORY_KEYWORD;
        }
        if description.contains(keyword) {
            score += DESCRIPTION_KEYWORD;
        }
    }
    score
}
