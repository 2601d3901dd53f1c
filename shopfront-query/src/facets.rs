//! Facet counts over a filtered result list.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shopfront_core::Product;

/// Options present in a result set, with product counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facets {
    pub categories: BTreeMap<String, usize>,
    pub colors: BTreeMap<String, usize>,
    pub sizes: BTreeMap<String, usize>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl Facets {
    /// Count each option once per product that offers it.
    pub fn collect<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut facets = Self::default();
        for product in products {
            *facets.categories.entry(product.category.clone()).or_insert(0) += 1;
            count_distinct(&mut facets.colors, product.colors.as_deref());
            count_distinct(&mut facets.sizes, product.sizes.as_deref());

            facets.price_min = Some(facets.price_min.map_or(product.price, |min| min.min(product.price)));
            facets.price_max = Some(facets.price_max.map_or(product.price, |max| max.max(product.price)));
        }
        facets
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn count_distinct(counts: &mut BTreeMap<String, usize>, values: Option<&[String]>) {
    let Some(values) = values else { return };
    let distinct: BTreeSet<&String> = values.iter().collect();
    for value in distinct {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
}
