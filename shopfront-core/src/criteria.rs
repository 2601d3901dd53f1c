//! Structured filter criteria and the partial updates applied to them.
//!
//! Every field of [`FilterCriteria`] has a default that imposes no
//! constraint, with one exception: `in_stock` defaults to `true`, so the
//! default view only shows products that can be ordered. The other flags
//! default to `false` ("not required").

use crate::{ProductFlags, ValidationError, MAX_RATING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Inclusive price range. `max` is `+∞` when unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    #[serde(default = "unbounded", skip_serializing_if = "is_unbounded")]
    pub max: f64,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

fn is_unbounded(max: &f64) -> bool {
    max.is_infinite()
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range with a lower bound only.
    pub fn at_least(min: f64) -> Self {
        Self {
            min,
            max: f64::INFINITY,
        }
    }

    /// True when the range admits every non-negative price.
    pub fn is_unrestricted(&self) -> bool {
        self.min <= 0.0 && self.max == f64::INFINITY
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.min.is_finite() || self.min < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "price.min".to_string(),
                reason: format!("{} must be a finite number >= 0", self.min),
            });
        }
        if self.max.is_nan() || self.max < self.min {
            return Err(ValidationError::InvalidValue {
                field: "price.max".to_string(),
                reason: format!("{} must be >= price.min ({})", self.max, self.min),
            });
        }
        Ok(())
    }
}

/// Inclusion constraints applied to each product as a logical AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub price: PriceRange,
    /// Match-any colour set. Empty means no constraint.
    pub colors: BTreeSet<String>,
    /// Match-any size set. Empty means no constraint.
    pub sizes: BTreeSet<String>,
    pub in_stock: bool,
    pub on_sale: bool,
    pub featured: bool,
    pub trending: bool,
    pub min_rating: f32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            category: None,
            subcategory: None,
            price: PriceRange::default(),
            colors: BTreeSet::new(),
            sizes: BTreeSet::new(),
            in_stock: true,
            on_sale: false,
            featured: false,
            trending: false,
            min_rating: 0.0,
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_price(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_in_stock(mut self, required: bool) -> Self {
        self.in_stock = required;
        self
    }

    pub fn with_on_sale(mut self, required: bool) -> Self {
        self.on_sale = required;
        self
    }

    pub fn with_featured(mut self, required: bool) -> Self {
        self.featured = required;
        self
    }

    pub fn with_trending(mut self, required: bool) -> Self {
        self.trending = required;
        self
    }

    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = rating;
        self
    }

    /// Flags a product must carry to pass the boolean criteria.
    pub fn required_flags(&self) -> ProductFlags {
        let mut flags = ProductFlags::empty();
        flags.set(ProductFlags::IN_STOCK, self.in_stock);
        flags.set(ProductFlags::ON_SALE, self.on_sale);
        flags.set(ProductFlags::FEATURED, self.featured);
        flags.set(ProductFlags::TRENDING, self.trending);
        flags
    }

    /// True when every field holds its default value.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Validate range invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.price.validate()?;
        if !self.min_rating.is_finite() || !(0.0..=MAX_RATING).contains(&self.min_rating) {
            return Err(ValidationError::InvalidValue {
                field: "min_rating".to_string(),
                reason: format!("{} must be within 0..=5", self.min_rating),
            });
        }
        Ok(())
    }

    /// Merge a partial update. Fields the update leaves as `None` are untouched.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(subcategory) = update.subcategory {
            self.subcategory = subcategory;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(in_stock) = update.in_stock {
            self.in_stock = in_stock;
        }
        if let Some(on_sale) = update.on_sale {
            self.on_sale = on_sale;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(trending) = update.trending {
            self.trending = trending;
        }
        if let Some(min_rating) = update.min_rating {
            self.min_rating = min_rating;
        }
    }

    /// Summary of every criterion that differs from its default.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let mut active = Vec::new();
        if let Some(category) = &self.category {
            active.push(ActiveFilter::Category(category.clone()));
        }
        if let Some(subcategory) = &self.subcategory {
            active.push(ActiveFilter::Subcategory(subcategory.clone()));
        }
        if !self.price.is_unrestricted() {
            active.push(ActiveFilter::Price(self.price));
        }
        if !self.colors.is_empty() {
            active.push(ActiveFilter::Colors(self.colors.iter().cloned().collect()));
        }
        if !self.sizes.is_empty() {
            active.push(ActiveFilter::Sizes(self.sizes.iter().cloned().collect()));
        }
        if !self.in_stock {
            active.push(ActiveFilter::IncludeOutOfStock);
        }
        if self.on_sale {
            active.push(ActiveFilter::OnSale);
        }
        if self.featured {
            active.push(ActiveFilter::Featured);
        }
        if self.trending {
            active.push(ActiveFilter::Trending);
        }
        if self.min_rating > 0.0 {
            active.push(ActiveFilter::MinRating(self.min_rating));
        }
        active
    }

    /// Reset the criterion behind one active-filter entry to its default.
    pub fn remove(&mut self, filter: &ActiveFilter) {
        let defaults = Self::default();
        match filter {
            ActiveFilter::Category(_) => self.category = None,
            ActiveFilter::Subcategory(_) => self.subcategory = None,
            ActiveFilter::Price(_) => self.price = defaults.price,
            ActiveFilter::Colors(_) => self.colors.clear(),
            ActiveFilter::Sizes(_) => self.sizes.clear(),
            ActiveFilter::IncludeOutOfStock => self.in_stock = defaults.in_stock,
            ActiveFilter::OnSale => self.on_sale = false,
            ActiveFilter::Featured => self.featured = false,
            ActiveFilter::Trending => self.trending = false,
            ActiveFilter::MinRating(_) => self.min_rating = defaults.min_rating,
        }
    }
}

/// Partial update for [`FilterCriteria`].
///
/// `category` and `subcategory` are doubly optional: `Some(None)` clears the
/// criterion, `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub category: Option<Option<String>>,
    pub subcategory: Option<Option<String>>,
    pub price: Option<PriceRange>,
    pub colors: Option<BTreeSet<String>>,
    pub sizes: Option<BTreeSet<String>>,
    pub in_stock: Option<bool>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub min_rating: Option<f32>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(Some(category.into()));
        self
    }

    pub fn clear_category(mut self) -> Self {
        self.category = Some(None);
        self
    }

    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(Some(subcategory.into()));
        self
    }

    pub fn clear_subcategory(mut self) -> Self {
        self.subcategory = Some(None);
        self
    }

    pub fn price(mut self, price: PriceRange) -> Self {
        self.price = Some(price);
        self
    }

    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = Some(sizes.into_iter().map(Into::into).collect());
        self
    }

    pub fn in_stock(mut self, required: bool) -> Self {
        self.in_stock = Some(required);
        self
    }

    pub fn on_sale(mut self, required: bool) -> Self {
        self.on_sale = Some(required);
        self
    }

    pub fn featured(mut self, required: bool) -> Self {
        self.featured = Some(required);
        self
    }

    pub fn trending(mut self, required: bool) -> Self {
        self.trending = Some(required);
        self
    }

    pub fn min_rating(mut self, rating: f32) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One entry of the active-filter summary shown to shoppers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ActiveFilter {
    Category(String),
    Subcategory(String),
    Price(PriceRange),
    Colors(Vec<String>),
    Sizes(Vec<String>),
    IncludeOutOfStock,
    OnSale,
    Featured,
    Trending,
    MinRating(f32),
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveFilter::Category(c) => write!(f, "Category: {}", c),
            ActiveFilter::Subcategory(s) => write!(f, "Subcategory: {}", s),
            ActiveFilter::Price(range) if range.max.is_infinite() => {
                write!(f, "Price: from {:.2}", range.min)
            }
            ActiveFilter::Price(range) => write!(f, "Price: {:.2} - {:.2}", range.min, range.max),
            ActiveFilter::Colors(colors) => write!(f, "Colors: {}", colors.join(", ")),
            ActiveFilter::Sizes(sizes) => write!(f, "Sizes: {}", sizes.join(", ")),
            ActiveFilter::IncludeOutOfStock => write!(f, "Including out of stock"),
            ActiveFilter::OnSale => write!(f, "On sale"),
            ActiveFilter::Featured => write!(f, "Featured"),
            ActiveFilter::Trending => write!(f, "Trending"),
            ActiveFilter::MinRating(r) => write!(f, "Rating: {}+", r),
        }
    }
}
