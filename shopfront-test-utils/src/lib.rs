//! SHOPFRONT Test Utilities
//!
//! Centralized test infrastructure for the shopfront workspace:
//! - Proptest generators for products, criteria and query inputs
//! - Key-value store fakes with injectable failures
//! - Test fixtures for common scenarios
//! - Custom assertions for shopfront-specific validation

// Re-export the in-memory store from its source crate
pub use shopfront_storage::{InMemoryKeyValueStore, KeyValueStore};

// Re-export core types for convenience
pub use shopfront_core::{
    ConfigError, EngineConfig, FilterCriteria, FilterUpdate, PageRequest, PriceRange, Product,
    ProductFlags, QueryError, SearchQuery, ShopfrontError, ShopfrontResult, SortKey,
    StorageError, Timestamp, ValidationError,
};

use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// ============================================================================
// STORE FAKES
// ============================================================================

/// Key-value store whose reads and writes can be made to fail.
///
/// Successful operations go to an inner [`InMemoryKeyValueStore`]. Every
/// `set` attempt is counted, failed or not.
#[derive(Debug, Default)]
pub struct FailingKeyValueStore {
    inner: InMemoryKeyValueStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
}

impl FailingKeyValueStore {
    /// A store that works until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store where every read and write fails.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    /// A working store pre-loaded with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inner: InMemoryKeyValueStore::with_entries(entries),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Read the inner store directly, ignoring injected failures.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).ok().flatten()
    }

    fn unavailable_error() -> ShopfrontError {
        StorageError::Unavailable {
            reason: "injected failure".to_string(),
        }
        .into()
    }
}

impl KeyValueStore for FailingKeyValueStore {
    fn get(&self, key: &str) -> ShopfrontResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> ShopfrontResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error());
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> ShopfrontResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error());
        }
        self.inner.remove(key)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating shopfront inputs.

    use super::*;
    use proptest::prelude::*;

    pub const CATEGORIES: [&str; 5] = ["bijoux", "bags", "clothing", "shoes", "accessories"];
    pub const COLORS: [&str; 6] = ["black", "white", "red", "blue", "gold", "silver"];
    pub const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // 2020-01-01 .. 2030-01-01
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_category() -> impl Strategy<Value = String> {
        prop::sample::select(CATEGORIES.to_vec()).prop_map(str::to_string)
    }

    fn arb_value_set(values: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
        prop::sample::subsequence(values.to_vec(), 0..=values.len())
            .prop_map(|picked| picked.into_iter().map(str::to_string).collect())
    }

    /// Generate ProductFlags from the four known bits.
    pub fn arb_flags() -> impl Strategy<Value = ProductFlags> {
        (0u8..16).prop_map(ProductFlags::from_bits_truncate)
    }

    /// Generate a well-formed Product (passes `Product::check`).
    pub fn arb_product() -> impl Strategy<Value = Product> {
        (
            "[a-z0-9]{1,12}",
            "[A-Za-z ]{1,24}",
            "[a-z ]{0,40}",
            arb_category(),
            0.0f64..1000.0,
            prop::option::of(arb_value_set(&COLORS)),
            prop::option::of(arb_value_set(&SIZES)),
            arb_flags(),
            0.0f32..=5.0,
            arb_timestamp(),
        )
            .prop_map(
                |(id, name, description, category, price, colors, sizes, flags, rating, created_at)| {
                    Product {
                        id,
                        name,
                        description,
                        category,
                        subcategory: None,
                        price,
                        colors,
                        sizes,
                        flags,
                        rating,
                        created_at,
                    }
                },
            )
    }

    /// Generate a catalogue with unique identifiers.
    pub fn arb_catalogue(max_len: usize) -> impl Strategy<Value = Vec<Product>> {
        prop::collection::vec(arb_product(), 0..=max_len).prop_map(|products| {
            products
                .into_iter()
                .enumerate()
                .map(|(i, mut product)| {
                    product.id = format!("p{:04}-{}", i, product.id);
                    product
                })
                .collect()
        })
    }

    /// Generate a valid PriceRange.
    pub fn arb_price_range() -> impl Strategy<Value = PriceRange> {
        prop_oneof![
            Just(PriceRange::default()),
            (0.0f64..500.0).prop_map(PriceRange::at_least),
            (0.0f64..500.0, 0.0f64..500.0).prop_map(|(a, b)| PriceRange::new(a.min(b), a.max(b))),
        ]
    }

    /// Generate valid FilterCriteria (passes `validate`).
    pub fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            prop::option::of(arb_category()),
            arb_price_range(),
            arb_value_set(&COLORS),
            arb_value_set(&SIZES),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            prop_oneof![Just(0.0f32), 0.0f32..=5.0],
        )
            .prop_map(
                |(category, price, colors, sizes, in_stock, on_sale, featured, trending, min_rating)| {
                    let mut criteria = FilterCriteria::new()
                        .with_price(price)
                        .with_colors(colors)
                        .with_sizes(sizes)
                        .with_in_stock(in_stock)
                        .with_on_sale(on_sale)
                        .with_featured(featured)
                        .with_trending(trending)
                        .with_min_rating(min_rating);
                    criteria.category = category;
                    criteria
                },
            )
    }

    pub fn arb_sort_key() -> impl Strategy<Value = SortKey> {
        prop::sample::select(SortKey::ALL.to_vec())
    }

    /// Generate a page request, including out-of-range pages.
    pub fn arb_page_request() -> impl Strategy<Value = PageRequest> {
        (0usize..12, 1usize..20).prop_map(|(page, size)| PageRequest::new(page, size))
    }

    /// Generate search text, including blank and below-minimum input.
    pub fn arb_search_query() -> impl Strategy<Value = SearchQuery> {
        prop_oneof![
            Just(SearchQuery::default()),
            "[a-z]{1}".prop_map(SearchQuery::new),
            "[a-z ]{0,12}".prop_map(SearchQuery::new),
            prop::sample::select(CATEGORIES.to_vec()).prop_map(SearchQuery::new),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// Identifiers of the three bijoux in [`sample_catalogue`], cheapest first.
    pub const BIJOUX_BY_PRICE: [&str; 3] = ["bij-02", "bij-01", "bij-03"];

    /// Identifier of the one out-of-stock product in [`sample_catalogue`].
    pub const OUT_OF_STOCK_ID: &str = "scarf-01";

    /// Creation time of the sample product added on `day` of March 2024.
    pub fn day(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Ten products across five categories, three of them "bijoux".
    ///
    /// Everything is in stock except [`OUT_OF_STOCK_ID`].
    pub fn sample_catalogue() -> Vec<Product> {
        vec![
            Product::new("tee-01", "Cotton Tee", "clothing", 19.0, day(1))
                .with_subcategory("tops")
                .with_description("Soft organic cotton t-shirt")
                .with_colors(["white", "black"])
                .with_sizes(["S", "M", "L"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::TRENDING)
                .with_rating(4.1),
            Product::new("bij-01", "Gold Hoop Earrings", "bijoux", 35.0, day(2))
                .with_subcategory("earrings")
                .with_description("Lightweight gold plated hoops")
                .with_colors(["gold"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::FEATURED)
                .with_rating(4.6),
            Product::new("bag-01", "Leather Tote", "bags", 120.0, day(3))
                .with_description("Full grain leather tote with inner pocket")
                .with_colors(["brown", "black"])
                .with_rating(4.4),
            Product::new("bij-02", "Silver Ring", "bijoux", 15.0, day(4))
                .with_subcategory("rings")
                .with_description("Sterling silver band")
                .with_colors(["silver"])
                .with_sizes(["52", "54"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::ON_SALE)
                .with_rating(4.0),
            Product::new("jean-01", "Slim Jeans", "clothing", 59.0, day(5))
                .with_subcategory("bottoms")
                .with_description("Stretch denim in a slim cut")
                .with_colors(["blue"])
                .with_sizes(["28", "30", "32"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::ON_SALE)
                .with_rating(3.8),
            Product::new("shoe-01", "Canvas Sneakers", "shoes", 65.0, day(6))
                .with_description("Everyday canvas sneakers")
                .with_colors(["white"])
                .with_sizes(["38", "40", "42"])
                .with_flags(
                    ProductFlags::IN_STOCK | ProductFlags::TRENDING | ProductFlags::FEATURED,
                )
                .with_rating(4.3),
            Product::new("bij-03", "Pearl Necklace", "bijoux", 55.0, day(7))
                .with_subcategory("necklaces")
                .with_description("Freshwater pearls on a silver chain")
                .with_colors(["white"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::TRENDING)
                .with_rating(4.8),
            Product::new(OUT_OF_STOCK_ID, "Wool Scarf", "accessories", 29.0, day(8))
                .with_description("Chunky knit merino scarf")
                .with_colors(["red", "grey"])
                .with_flags(ProductFlags::empty())
                .with_rating(4.0),
            Product::new("hat-01", "Straw Hat", "accessories", 25.0, day(9))
                .with_description("Wide brim summer hat")
                .with_colors(["beige"])
                .with_sizes(["M", "L"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::ON_SALE)
                .with_rating(3.5),
            Product::new("dress-01", "Summer Dress", "clothing", 79.0, day(10))
                .with_subcategory("dresses")
                .with_description("Light linen dress with a floral print")
                .with_colors(["red", "white"])
                .with_sizes(["S", "M"])
                .with_flags(ProductFlags::IN_STOCK | ProductFlags::FEATURED)
                .with_rating(4.7),
        ]
    }

    /// The sample catalogue as a JSON array.
    pub fn sample_catalogue_json() -> String {
        serde_json::to_string_pretty(&sample_catalogue()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Default configuration with a custom page size.
    pub fn config_with_page_size(page_size: usize) -> EngineConfig {
        EngineConfig::new().with_page_size(page_size)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for shopfront-specific validation.

    use super::*;

    /// Assert that a ShopfrontResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &ShopfrontResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a ShopfrontResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &ShopfrontResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &ShopfrontResult<T>) {
        match result {
            Err(ShopfrontError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &ShopfrontResult<T>) {
        match result {
            Err(ShopfrontError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_malformed_product<T: std::fmt::Debug>(result: &ShopfrontResult<T>, id: &str) {
        match result {
            Err(ShopfrontError::Query(QueryError::MalformedProduct { id: got, .. })) if got == id => {}
            other => panic!("Expected MalformedProduct({}), got: {:?}", id, other),
        }
    }

    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &ShopfrontResult<T>) {
        match result {
            Err(ShopfrontError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert the products carry exactly these identifiers, in order.
    #[track_caller]
    pub fn assert_ids(products: &[Product], expected: &[&str]) {
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, expected, "Unexpected product order");
    }

    /// Assert no identifier appears twice.
    #[track_caller]
    pub fn assert_unique_ids(products: &[Product]) {
        let mut seen = std::collections::HashSet::new();
        for product in products {
            assert!(seen.insert(product.id.as_str()), "Duplicate product id: {}", product.id);
        }
    }

    /// Assert `page` holds the `page_number`-th slice of `items`.
    #[track_caller]
    pub fn assert_page_of(page: &[Product], items: &[Product], page_number: usize, page_size: usize) {
        let start = page_number.saturating_sub(1).saturating_mul(page_size);
        let expected: &[Product] = if page_number == 0 || start >= items.len() {
            &[]
        } else {
            &items[start..(start + page_size).min(items.len())]
        };
        assert_eq!(page, expected, "Page {} does not match the sorted list", page_number);
    }

    /// Assert every product passes its own record check.
    #[track_caller]
    pub fn assert_well_formed(products: &[Product]) {
        for product in products {
            assert!(product.check().is_ok(), "Malformed product: {:?}", product);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
