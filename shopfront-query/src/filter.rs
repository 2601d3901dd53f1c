//! Filter predicate.
//!
//! A product is included when it satisfies every active criterion. Criteria
//! at their default value never exclude anything, and a product that lacks
//! the data a criterion looks at (no colours, no subcategory) fails that
//! criterion instead of raising an error.

use std::collections::BTreeSet;

use shopfront_core::{FilterCriteria, Product, QueryError};

/// Whether `product` passes every active criterion.
pub fn matches(product: &Product, criteria: &FilterCriteria) -> bool {
    matches_category(product, criteria)
        && matches_subcategory(product, criteria)
        && criteria.price.contains(product.price)
        && intersects(&criteria.colors, product.colors.as_deref())
        && intersects(&criteria.sizes, product.sizes.as_deref())
        && product.flags.contains(criteria.required_flags())
        && product.rating >= criteria.min_rating
}

/// Keep the products that match `criteria`, preserving their order.
///
/// Every examined product is checked first; the first malformed record
/// aborts the stage.
pub fn filter_products<'a, I>(products: I, criteria: &FilterCriteria) -> Result<Vec<&'a Product>, QueryError>
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut kept = Vec::new();
    for product in products {
        product.check()?;
        if matches(product, criteria) {
            kept.push(product);
        }
    }
    Ok(kept)
}

fn matches_category(product: &Product, criteria: &FilterCriteria) -> bool {
    match &criteria.category {
        Some(category) => product.category == *category,
        None => true,
    }
}

fn matches_subcategory(product: &Product, criteria: &FilterCriteria) -> bool {
    match &criteria.subcategory {
        Some(subcategory) => product.subcategory.as_deref() == Some(subcategory.as_str()),
        None => true,
    }
}

/// Match-any: an empty wanted set is no constraint.
fn intersects(wanted: &BTreeSet<String>, offered: Option<&[String]>) -> bool {
    if wanted.is_empty() {
        return true;
    }
    offered.is_some_and(|offered| offered.iter().any(|value| wanted.contains(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shopfront_core::{PriceRange, ProductFlags};

    fn shirt() -> Product {
        Product::new(
            "shirt-1",
            "Linen Shirt",
            "clothing",
            45.0,
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        )
        .with_subcategory("shirts")
        .with_colors(["white", "blue"])
        .with_sizes(["S", "M", "L"])
        .with_rating(4.2)
    }

    #[test]
    fn test_default_criteria_admit_in_stock_product() {
        assert!(matches(&shirt(), &FilterCriteria::default()));
    }

    #[test]
    fn test_default_criteria_exclude_out_of_stock() {
        let product = shirt().with_flags(ProductFlags::empty());
        assert!(!matches(&product, &FilterCriteria::default()));
        assert!(matches(&product, &FilterCriteria::new().with_in_stock(false)));
    }

    #[test]
    fn test_category_is_exact() {
        assert!(matches(&shirt(), &FilterCriteria::new().with_category("clothing")));
        assert!(!matches(&shirt(), &FilterCriteria::new().with_category("Clothing")));
    }

    #[test]
    fn test_subcategory_missing_on_product_fails() {
        let mut product = shirt();
        product.subcategory = None;
        assert!(!matches(&product, &FilterCriteria::new().with_subcategory("shirts")));
    }

    #[test]
    fn test_price_bounds_inclusive() {
        assert!(matches(&shirt(), &FilterCriteria::new().with_price(PriceRange::new(45.0, 45.0))));
        assert!(!matches(&shirt(), &FilterCriteria::new().with_price(PriceRange::new(0.0, 44.99))));
    }

    #[test]
    fn test_colors_match_any() {
        assert!(matches(&shirt(), &FilterCriteria::new().with_colors(["red", "blue"])));
        assert!(!matches(&shirt(), &FilterCriteria::new().with_colors(["red"])));
    }

    #[test]
    fn test_missing_sizes_fail_active_size_criterion() {
        let mut product = shirt();
        product.sizes = None;
        assert!(!matches(&product, &FilterCriteria::new().with_sizes(["M"])));
        assert!(matches(&product, &FilterCriteria::new()));
    }

    #[test]
    fn test_flags_required_only_when_active() {
        let criteria = FilterCriteria::new().with_on_sale(true);
        assert!(!matches(&shirt(), &criteria));

        let on_sale = shirt().with_flags(ProductFlags::IN_STOCK | ProductFlags::ON_SALE);
        assert!(matches(&on_sale, &criteria));
        assert!(matches(&on_sale, &FilterCriteria::default()));
    }

    #[test]
    fn test_min_rating_threshold() {
        assert!(matches(&shirt(), &FilterCriteria::new().with_min_rating(4.2)));
        assert!(!matches(&shirt(), &FilterCriteria::new().with_min_rating(4.5)));
    }

    #[test]
    fn test_filter_products_rejects_malformed_record() {
        let mut broken = shirt();
        broken.id = "broken".to_string();
        broken.price = f64::NAN;
        let products = [shirt(), broken];

        let err = filter_products(&products, &FilterCriteria::default()).unwrap_err();
        assert!(matches!(err, QueryError::MalformedProduct { ref id, .. } if id == "broken"));
    }

    #[test]
    fn test_filter_products_preserves_order() {
        let a = shirt();
        let mut b = shirt();
        b.id = "shirt-2".to_string();
        let products = [a, b];
        let kept = filter_products(&products, &FilterCriteria::default()).unwrap();
        let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["shirt-1", "shirt-2"]);
    }
}
