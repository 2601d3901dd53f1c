//! SHOPFRONT Query - Product Query Engine
//!
//! Turns a mutable query (search term, filter criteria, sort key, page)
//! into a filtered, sorted, paginated view of an in-memory catalogue.
//!
//! Stages run in a fixed order: search, filter, sort, paginate. Results are
//! memoized per exact query signature in a bounded FIFO cache, and
//! non-trivial search terms are remembered in a persisted history.
//!
//! ```ignore
//! let catalog = Arc::new(InMemoryCatalog::from_json(&json)?);
//! let store = Arc::new(JsonFileStore::new("state.json"));
//! let mut engine = QueryEngine::new(catalog, store, EngineConfig::default())?;
//!
//! engine.set_filters(FilterUpdate::new().category("bijoux"))?;
//! engine.set_sort(SortKey::PriceAsc);
//! let result = engine.refresh()?;
//! ```

pub mod catalog;
pub mod debounce;
pub mod engine;
pub mod facets;
pub mod filter;
pub mod paginate;
pub mod pipeline;
pub mod search;
pub mod sort;

pub use catalog::{InMemoryCatalog, ProductCatalog};
pub use debounce::{DebouncedEngine, Debouncer};
pub use engine::{EngineSnapshot, EngineStats, EngineStatus, QueryEngine};
pub use facets::Facets;
pub use filter::{filter_products, matches};
pub use paginate::page_slice;
pub use pipeline::{run_pipeline, QueryResult};
pub use search::{relevance_score, search};
pub use sort::sort_products;
