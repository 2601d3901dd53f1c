//! The query engine.
//!
//! `QueryEngine` owns the mutable query state (term, criteria, sort, page),
//! the result cache and the search history. Setters only change state and
//! mark the current result stale; [`QueryEngine::refresh`] executes the
//! query, consulting the cache first.
//!
//! Per execution the engine moves through
//! `Idle -> Computing -> {ResultReady | Error}`, and back to `Idle` on the
//! next state change or execution. A cache hit goes straight to
//! `ResultReady` without computing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopfront_core::{
    ActiveFilter, EngineConfig, FilterCriteria, FilterUpdate, PageRequest, Product,
    QuerySignature, SearchQuery, ShopfrontError, ShopfrontResult, SortKey,
};
use shopfront_storage::{CacheKey, CacheStats, KeyValueStore, QueryCache, SearchHistory};

use crate::catalog::ProductCatalog;
use crate::facets::Facets;
use crate::pipeline::{run_pipeline, QueryResult};

/// Where the engine is in its execution cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// No execution in flight; the last result may be stale.
    #[default]
    Idle,
    /// The pipeline is running.
    Computing,
    /// The last result matches the current query state.
    ResultReady,
    /// The last execution failed. The previous result is still available.
    Error,
}

/// Read-only view of the engine for consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// The displayed page.
    pub products: Vec<Product>,
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
    pub loading: bool,
    pub status: EngineStatus,
    pub error: Option<String>,
    pub active_filters: Vec<ActiveFilter>,
    pub history: Vec<String>,
    pub facets: Facets,
    pub sort: SortKey,
    pub query: String,
}

/// Counters for monitoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStats {
    pub cache: CacheStats,
    /// Number of times the pipeline actually ran (cache misses).
    pub pipeline_runs: u64,
}

/// Single-writer product query engine.
pub struct QueryEngine {
    catalog: Arc<dyn ProductCatalog>,
    config: EngineConfig,
    criteria: FilterCriteria,
    query: SearchQuery,
    sort: SortKey,
    page: usize,
    cache: QueryCache<QueryResult>,
    history: SearchHistory,
    status: EngineStatus,
    last_result: Option<Arc<QueryResult>>,
    /// Set when the query, criteria or sort changed since `last_result`.
    stale: bool,
    last_error: Option<ShopfrontError>,
    pipeline_runs: u64,
}

impl QueryEngine {
    /// Create an engine. The search history is loaded from `store`.
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        store: Arc<dyn KeyValueStore>,
        config: EngineConfig,
    ) -> ShopfrontResult<Self> {
        config.validate()?;
        let history = SearchHistory::load(store, config.history_key.clone(), config.history_limit);
        tracing::debug!(
            products = catalog.products().len(),
            history = history.len(),
            cache_capacity = config.cache_capacity,
            "Query engine initialized"
        );

        Ok(Self {
            catalog,
            cache: QueryCache::new(config.cache_capacity),
            config,
            criteria: FilterCriteria::default(),
            query: SearchQuery::default(),
            sort: SortKey::default(),
            page: 1,
            history,
            status: EngineStatus::Idle,
            last_result: None,
            stale: true,
            last_error: None,
            pipeline_runs: 0,
        })
    }

    // === Accessors ===

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn history(&self) -> &[String] {
        self.history.terms()
    }

    pub fn last_result(&self) -> Option<Arc<QueryResult>> {
        self.last_result.clone()
    }

    pub fn last_error(&self) -> Option<&ShopfrontError> {
        self.last_error.as_ref()
    }

    // === Query state ===

    /// Replace the search text. Returns to the first page.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.query = SearchQuery::new(text);
        self.query_changed();
    }

    /// Merge a partial criteria update. Returns to the first page.
    ///
    /// The merged criteria are validated first; on failure nothing changes.
    pub fn set_filters(&mut self, update: FilterUpdate) -> ShopfrontResult<()> {
        let mut next = self.criteria.clone();
        next.apply(update);
        next.validate()?;
        self.criteria = next;
        self.query_changed();
        Ok(())
    }

    /// Reset the criterion behind one active-filter entry.
    pub fn remove_filter(&mut self, filter: &ActiveFilter) {
        self.criteria.remove(filter);
        self.query_changed();
    }

    /// Restore default criteria. The search text and sort key are kept.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.query_changed();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.query_changed();
    }

    /// Select a page, clamped to `[1, total pages of the last result]`.
    ///
    /// Once the query, criteria or sort change, the last result no longer
    /// bounds the page count and only the lower bound applies. A page past
    /// the end displays empty.
    pub fn go_to_page(&mut self, page: usize) {
        let last = match &self.last_result {
            Some(result) if !self.stale => result.total_pages,
            _ => usize::MAX,
        };
        self.page = page.clamp(1, last.max(1));
        self.transition(EngineStatus::Idle);
    }

    fn query_changed(&mut self) {
        self.page = 1;
        self.stale = true;
        self.transition(EngineStatus::Idle);
    }

    // === Execution ===

    /// Execute the current query, from cache when possible.
    ///
    /// A non-trivial search term is recorded into the history on success.
    /// On failure the cache and history are left untouched, the error is
    /// kept for the snapshot, and the engine stays usable.
    pub fn refresh(&mut self) -> ShopfrontResult<Arc<QueryResult>> {
        self.transition(EngineStatus::Idle);

        let min_len = self.config.min_search_len;
        let request = PageRequest::new(self.page, self.config.page_size);
        let key = CacheKey::from_signature(&QuerySignature::new(
            &self.criteria,
            &self.query,
            self.sort,
            request,
        ));
        let term = self.query.effective_term(min_len).map(str::to_owned);

        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!(key = %key, page = request.page, "Query cache hit");
            let result = entry.value();
            self.publish(Arc::clone(&result), term.as_deref());
            return Ok(result);
        }
        tracing::debug!(key = %key, page = request.page, "Query cache miss");

        self.transition(EngineStatus::Computing);
        self.pipeline_runs += 1;
        let outcome = run_pipeline(
            self.catalog.products(),
            &QuerySignature::new(&self.criteria, &self.query, self.sort, request),
            min_len,
        );

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                self.cache.put_arc(key, Arc::clone(&result));
                self.publish(Arc::clone(&result), term.as_deref());
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, query = %self.query.as_str(), "Query pipeline failed");
                self.last_error = Some(e.clone());
                self.transition(EngineStatus::Error);
                Err(e)
            }
        }
    }

    fn publish(&mut self, result: Arc<QueryResult>, term: Option<&str>) {
        if let Some(term) = term {
            self.history.record(term);
        }
        tracing::debug!(total = result.total, total_pages = result.total_pages, "Query result ready");
        self.last_result = Some(result);
        self.stale = false;
        self.last_error = None;
        self.transition(EngineStatus::ResultReady);
    }

    fn transition(&mut self, next: EngineStatus) {
        if self.status != next {
            tracing::debug!(from = ?self.status, to = ?next, "Engine status changed");
            self.status = next;
        }
    }

    // === History and cache ===

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Forget one remembered term. Returns whether it was present.
    pub fn remove_history_term(&mut self, term: &str) -> bool {
        self.history.remove(term)
    }

    /// Remembered terms starting with `prefix`, most recent first.
    pub fn history_suggestions(&self, prefix: &str) -> Vec<&str> {
        self.history.matching(prefix)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // === Observation ===

    pub fn snapshot(&self) -> EngineSnapshot {
        let (products, total, total_pages, facets) = match &self.last_result {
            Some(result) => (
                result.page.clone(),
                result.total,
                result.total_pages,
                result.facets.clone(),
            ),
            None => (Vec::new(), 0, 1, Facets::default()),
        };

        EngineSnapshot {
            products,
            total,
            total_pages,
            page: self.page,
            page_size: self.config.page_size,
            loading: self.status == EngineStatus::Computing,
            status: self.status,
            error: self.last_error.as_ref().map(ToString::to_string),
            active_filters: self.criteria.active_filters(),
            history: self.history.terms().to_vec(),
            facets,
            sort: self.sort,
            query: self.query.as_str().to_string(),
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache: self.cache.stats(),
            pipeline_runs: self.pipeline_runs,
        }
    }
}

impl fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("config", &self.config)
            .field("criteria", &self.criteria)
            .field("query", &self.query)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("status", &self.status)
            .field("cached", &self.cache.len())
            .field("pipeline_runs", &self.pipeline_runs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use chrono::{TimeZone, Utc};
    use shopfront_core::{PriceRange, ValidationError};
    use shopfront_storage::InMemoryKeyValueStore;

    fn product(id: &str, name: &str, category: &str, price: f64) -> Product {
        Product::new(
            id,
            name,
            category,
            price,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn engine_with(products: Vec<Product>, page_size: usize) -> QueryEngine {
        let catalog = Arc::new(InMemoryCatalog::new(products).unwrap());
        let store = Arc::new(InMemoryKeyValueStore::new());
        QueryEngine::new(catalog, store, EngineConfig::new().with_page_size(page_size)).unwrap()
    }

    fn engine() -> QueryEngine {
        engine_with(
            vec![
                product("1", "Gold Ring", "bijoux", 40.0),
                product("2", "Tote", "bags", 80.0),
                product("3", "Silver Ring", "bijoux", 20.0),
            ],
            2,
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let catalog = Arc::new(InMemoryCatalog::default());
        let store = Arc::new(InMemoryKeyValueStore::new());
        let result = QueryEngine::new(catalog, store, EngineConfig::new().with_page_size(0));
        assert!(matches!(result, Err(ShopfrontError::Config(_))));
    }

    #[test]
    fn test_initial_snapshot_is_empty_and_idle() {
        let snapshot = engine().snapshot();
        assert_eq!(snapshot.status, EngineStatus::Idle);
        assert!(snapshot.products.is_empty());
        assert_eq!(snapshot.page, 1);
        assert!(!snapshot.loading);
    }

    #[test]
    fn test_refresh_reaches_result_ready() {
        let mut engine = engine();
        let result = engine.refresh().unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(engine.status(), EngineStatus::ResultReady);
    }

    #[test]
    fn test_setters_return_to_first_page_and_idle() {
        let mut engine = engine();
        engine.refresh().unwrap();
        engine.go_to_page(2);
        assert_eq!(engine.page(), 2);

        engine.set_sort(SortKey::PriceAsc);
        assert_eq!(engine.page(), 1);
        assert_eq!(engine.status(), EngineStatus::Idle);
    }

    #[test]
    fn test_go_to_page_clamps_to_known_pages() {
        let mut engine = engine();
        engine.refresh().unwrap();
        engine.go_to_page(99);
        assert_eq!(engine.page(), 2);
        engine.go_to_page(0);
        assert_eq!(engine.page(), 1);
    }

    #[test]
    fn test_go_to_page_after_setter_is_not_bounded_by_old_result() {
        let mut engine = engine();
        engine
            .set_filters(FilterUpdate::new().category("bags"))
            .unwrap();
        engine.refresh().unwrap();
        engine.go_to_page(2);
        assert_eq!(engine.page(), 1);

        engine.reset_filters();
        engine.go_to_page(2);
        assert_eq!(engine.page(), 2);

        let result = engine.refresh().unwrap();
        assert_eq!(result.page_number, 2);
        assert_eq!(result.page.len(), 1);
    }

    #[test]
    fn test_invalid_filter_update_leaves_state_unchanged() {
        let mut engine = engine();
        engine
            .set_filters(FilterUpdate::new().category("bijoux"))
            .unwrap();
        let err = engine
            .set_filters(FilterUpdate::new().price(PriceRange::new(50.0, 10.0)))
            .unwrap_err();

        assert!(matches!(err, ShopfrontError::Validation(ValidationError::InvalidValue { .. })));
        assert_eq!(engine.criteria().category.as_deref(), Some("bijoux"));
        assert!(engine.criteria().price.is_unrestricted());
    }

    #[test]
    fn test_cache_hit_skips_pipeline() {
        let mut engine = engine();
        let first = engine.refresh().unwrap();
        let second = engine.refresh().unwrap();

        assert_eq!(first, second);
        let stats = engine.stats();
        assert_eq!(stats.pipeline_runs, 1);
        assert_eq!(stats.cache.hits, 1);
        assert_eq!(stats.cache.misses, 1);
    }

    #[test]
    fn test_short_term_is_not_recorded() {
        let mut engine = engine();
        engine.set_search_query("r");
        engine.refresh().unwrap();
        assert!(engine.history().is_empty());

        engine.set_search_query("  ring ");
        engine.refresh().unwrap();
        assert_eq!(engine.history(), ["ring"]);
    }

    #[test]
    fn test_reset_filters_keeps_query_and_sort() {
        let mut engine = engine();
        engine.set_search_query("ring");
        engine.set_sort(SortKey::PriceDesc);
        engine
            .set_filters(FilterUpdate::new().category("bags").on_sale(true))
            .unwrap();

        engine.reset_filters();
        assert!(engine.criteria().is_default());
        assert_eq!(engine.query().as_str(), "ring");
        assert_eq!(engine.sort(), SortKey::PriceDesc);
    }

    #[test]
    fn test_remove_filter() {
        let mut engine = engine();
        engine
            .set_filters(FilterUpdate::new().category("bijoux").trending(true))
            .unwrap();
        engine.remove_filter(&ActiveFilter::Trending);

        let snapshot = engine.snapshot();
        assert_eq!(
            snapshot.active_filters,
            vec![ActiveFilter::Category("bijoux".to_string())]
        );
    }

    #[test]
    fn test_history_management() {
        let mut engine = engine();
        for term in ["ring", "tote", "rings"] {
            engine.set_search_query(term);
            engine.refresh().unwrap();
        }
        assert_eq!(engine.history_suggestions("ri"), vec!["rings", "ring"]);
        assert!(engine.remove_history_term("tote"));
        engine.clear_history();
        assert!(engine.snapshot().history.is_empty());
    }

    #[test]
    fn test_clear_cache_forces_recompute() {
        let mut engine = engine();
        engine.refresh().unwrap();
        engine.clear_cache();
        engine.refresh().unwrap();
        assert_eq!(engine.stats().pipeline_runs, 2);
    }
}
