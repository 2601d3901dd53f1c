//! Debounced refresh behaviour, on a paused Tokio clock.

use std::sync::Arc;
use std::time::Duration;

use shopfront_core::{EngineConfig, FilterUpdate, QueryError, ShopfrontError, SortKey};
use shopfront_query::{DebouncedEngine, InMemoryCatalog, QueryEngine};
use shopfront_storage::InMemoryKeyValueStore;
use shopfront_test_utils::fixtures;

const DELAY: Duration = Duration::from_millis(300);

fn debounced() -> DebouncedEngine {
    let catalog = Arc::new(InMemoryCatalog::new(fixtures::sample_catalogue()).unwrap());
    let store = Arc::new(InMemoryKeyValueStore::new());
    let config = EngineConfig::new().with_page_size(2).with_debounce(DELAY);
    DebouncedEngine::new(QueryEngine::new(catalog, store, config).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_runs_once_with_last_term() {
    let mut engine = debounced();
    for text in ["ri", "rin", "ring"] {
        engine.set_search_query(text).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(engine.stats().unwrap().pipeline_runs, 0);
    assert!(engine.snapshot().unwrap().loading);

    tokio::time::sleep(DELAY).await;
    let snapshot = engine.snapshot().unwrap();
    assert_eq!(engine.stats().unwrap().pipeline_runs, 1);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.history, vec!["ring".to_string()]);
    assert_eq!(snapshot.query, "ring");
    assert_eq!(snapshot.total, 2);
}

#[tokio::test(start_paused = true)]
async fn test_mixed_setters_share_one_refresh() {
    let mut engine = debounced();
    engine
        .set_filters(FilterUpdate::new().category("bijoux"))
        .unwrap();
    engine.set_sort(SortKey::PriceAsc).unwrap();

    tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
    let snapshot = engine.snapshot().unwrap();
    assert_eq!(engine.stats().unwrap().pipeline_runs, 1);
    assert_eq!(snapshot.total, 3);
    let ids: Vec<&str> = snapshot.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, &fixtures::BIJOUX_BY_PRICE[..2]);

    engine.go_to_page(2).unwrap();
    tokio::time::sleep(DELAY + Duration::from_millis(1)).await;
    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.page, 2);
    assert_eq!(snapshot.products.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flush_runs_immediately() {
    let mut engine = debounced();
    engine.set_search_query("pearl").unwrap();
    assert!(engine.is_pending());

    let result = engine.flush().unwrap();
    assert_eq!(result.total, 1);
    assert!(!engine.is_pending());

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(engine.stats().unwrap().pipeline_runs, 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_refresh() {
    let mut engine = debounced();
    let shared = engine.shared();
    engine.set_search_query("silver").unwrap();
    drop(engine);

    tokio::time::sleep(DELAY * 2).await;
    let inner = shared.lock().unwrap();
    assert_eq!(inner.stats().pipeline_runs, 0);
    assert!(inner.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_update_schedules_nothing() {
    let mut engine = debounced();
    assert!(engine
        .set_filters(FilterUpdate::new().min_rating(-1.0))
        .is_err());
    assert!(!engine.is_pending());
}

#[test]
fn test_setter_outside_runtime_fails_without_changing_state() {
    let mut engine = debounced();
    let result = engine.set_search_query("ring");
    assert!(matches!(
        result,
        Err(ShopfrontError::Query(QueryError::PipelineFailed { .. }))
    ));
    assert!(!engine.is_pending());

    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.query, "");
    assert_eq!(engine.stats().unwrap().pipeline_runs, 0);

    // flush needs no runtime
    let result = engine.flush().unwrap();
    assert_eq!(result.total, 9);
}
