//! Pipeline composition: search, filter, sort, paginate.
//!
//! The pipeline is a pure function of the product list and the query
//! signature. It never touches the cache or the search history; the engine
//! owns those side effects.

use serde::{Deserialize, Serialize};
use shopfront_core::{Product, QuerySignature, ShopfrontResult};

use crate::facets::Facets;
use crate::filter::filter_products;
use crate::paginate::page_slice;
use crate::search::search;
use crate::sort::sort_products;

/// Outcome of one pipeline run. This is what the cache memoizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Every matching product, sorted.
    pub items: Vec<Product>,
    /// The requested page of `items`.
    pub page: Vec<Product>,
    pub total: usize,
    pub total_pages: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub facets: Facets,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Run every stage for one signature.
///
/// Errors only on a zero page size or a malformed product record. An empty
/// result, an out-of-range page or a too-short query are all normal results.
pub fn run_pipeline(
    products: &[Product],
    signature: &QuerySignature<'_>,
    min_search_len: usize,
) -> ShopfrontResult<QueryResult> {
    signature.page.validate()?;

    let searched = search(products, signature.query, min_search_len);
    let filtered = filter_products(searched, signature.criteria)?;
    let term = signature.query.effective_term(min_search_len);
    let sorted = sort_products(&filtered, signature.sort, term);

    let total = sorted.len();
    let page = page_slice(&sorted, signature.page);

    Ok(QueryResult {
        page: page.iter().map(|p| (*p).clone()).collect(),
        total,
        total_pages: signature.page.total_pages(total),
        page_number: signature.page.page,
        page_size: signature.page.page_size,
        facets: Facets::collect(sorted.iter().copied()),
        items: sorted.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shopfront_core::{
        FilterCriteria, PageRequest, QueryError, SearchQuery, ShopfrontError, SortKey,
        ValidationError,
    };

    fn product(id: &str, name: &str, category: &str, price: f64) -> Product {
        Product::new(
            id,
            name,
            category,
            price,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product("r1", "Gold Ring", "bijoux", 40.0),
            product("b1", "Tote", "bags", 80.0),
            product("r2", "Silver Ring", "bijoux", 20.0),
            product("n1", "Necklace", "bijoux", 60.0),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_search_then_filter_then_sort() {
        let products = catalogue();
        let criteria = FilterCriteria::new().with_category("bijoux");
        let query = SearchQuery::new("ring");
        let signature = QuerySignature::new(&criteria, &query, SortKey::PriceAsc, PageRequest::first(10));

        let result = run_pipeline(&products, &signature, 2).unwrap();
        assert_eq!(ids(&result.items), vec!["r2", "r1"]);
        assert_eq!(result.total, 2);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.facets.categories.get("bijoux"), Some(&2));
    }

    #[test]
    fn test_zero_results_is_not_an_error() {
        let products = catalogue();
        let criteria = FilterCriteria::new().with_category("shoes");
        let query = SearchQuery::default();
        let signature = QuerySignature::new(&criteria, &query, SortKey::Relevance, PageRequest::first(10));

        let result = run_pipeline(&products, &signature, 2).unwrap();
        assert!(result.is_empty());
        assert!(result.page.is_empty());
        assert_eq!(result.total_pages, 1);
    }

    #[test]
    fn test_page_beyond_last_is_empty() {
        let products = catalogue();
        let criteria = FilterCriteria::default();
        let query = SearchQuery::default();
        let signature = QuerySignature::new(&criteria, &query, SortKey::Relevance, PageRequest::new(9, 2));

        let result = run_pipeline(&products, &signature, 2).unwrap();
        assert!(result.page.is_empty());
        assert_eq!(result.total, 4);
        assert_eq!(result.total_pages, 2);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let products = catalogue();
        let criteria = FilterCriteria::default();
        let query = SearchQuery::default();
        let signature = QuerySignature::new(&criteria, &query, SortKey::Relevance, PageRequest::new(1, 0));

        assert!(matches!(
            run_pipeline(&products, &signature, 2),
            Err(ShopfrontError::Validation(ValidationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_malformed_product_fails_the_run() {
        let mut products = catalogue();
        products[1].rating = 9.0;
        let criteria = FilterCriteria::default();
        let query = SearchQuery::default();
        let signature = QuerySignature::new(&criteria, &query, SortKey::Relevance, PageRequest::first(10));

        assert!(matches!(
            run_pipeline(&products, &signature, 2),
            Err(ShopfrontError::Query(QueryError::MalformedProduct { .. }))
        ));
    }
}
