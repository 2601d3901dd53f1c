//! Product catalogue provider.
//!
//! The engine only ever reads the catalogue. Products are loaded once and
//! kept in their source order, which is the order results fall back to when
//! no sort key imposes one.

use std::collections::HashMap;

use shopfront_core::{Product, ProductId, ShopfrontResult, StorageError, ValidationError};

/// Read-only access to the product collection.
pub trait ProductCatalog: Send + Sync {
    /// Every product, in source order.
    fn products(&self) -> &[Product];

    /// Look up a product by identifier.
    fn get(&self, id: &str) -> Option<&Product>;

    /// Products whose category equals `category` exactly, in source order.
    fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products()
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }
}

/// Catalogue held entirely in memory with an identifier index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl InMemoryCatalog {
    /// Build a catalogue. Identifiers must be unique.
    pub fn new(products: Vec<Product>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), position).is_some() {
                return Err(ValidationError::DuplicateProductId {
                    id: product.id.clone(),
                });
            }
        }
        Ok(Self { products, index })
    }

    /// Load a catalogue from a JSON array of products.
    pub fn from_json(json: &str) -> ShopfrontResult<Self> {
        let products: Vec<Product> =
            serde_json::from_str(json).map_err(|e| StorageError::Serialization {
                reason: e.to_string(),
            })?;
        let catalog = Self::new(products)?;
        tracing::debug!(products = catalog.len(), "Loaded product catalogue");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }

    fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).map(|&position| &self.products[position])
    }
}
