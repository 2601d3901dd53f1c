//! Product records supplied by the catalogue.

use crate::{ProductId, QueryError, Timestamp, MAX_RATING};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Merchandising flags carried by a product.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ProductFlags: u8 {
        /// Product can be ordered right now
        const IN_STOCK = 0b0000_0001;
        /// Product is discounted
        const ON_SALE = 0b0000_0010;
        /// Product is promoted by the shop
        const FEATURED = 0b0000_0100;
        /// Product is currently popular
        const TRENDING = 0b0000_1000;
    }
}

impl Default for ProductFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A catalogue product. Read-only from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub price: f64,
    /// Colours the product ships in. `None` when the catalogue has no colour data.
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    /// Sizes the product ships in. `None` when the catalogue has no size data.
    #[serde(default)]
    pub sizes: Option<Vec<String>>,
    #[serde(default)]
    pub flags: ProductFlags,
    #[serde(default)]
    pub rating: f32,
    pub created_at: Timestamp,
}

impl Product {
    /// Create a product with the required fields. New products start in stock.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            subcategory: None,
            price,
            colors: None,
            sizes: None,
            flags: ProductFlags::IN_STOCK,
            rating: 0.0,
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = Some(sizes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_flags(mut self, flags: ProductFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating;
        self
    }

    pub fn in_stock(&self) -> bool {
        self.flags.contains(ProductFlags::IN_STOCK)
    }

    pub fn on_sale(&self) -> bool {
        self.flags.contains(ProductFlags::ON_SALE)
    }

    pub fn featured(&self) -> bool {
        self.flags.contains(ProductFlags::FEATURED)
    }

    pub fn trending(&self) -> bool {
        self.flags.contains(ProductFlags::TRENDING)
    }

    /// Check the record for values the pipeline cannot order or compare.
    ///
    /// Rejects an empty identifier, a negative or non-finite price, and a
    /// rating outside `0..=5`.
    pub fn check(&self) -> Result<(), QueryError> {
        let malformed = |reason: String| QueryError::MalformedProduct {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(malformed("identifier is empty".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(malformed(format!("price {} is not a non-negative number", self.price)));
        }
        if !self.rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(malformed(format!("rating {} is outside 0..=5", self.rating)));
        }
        Ok(())
    }
}
