//! SHOPFRONT Core - Query Types
//!
//! Pure data structures for the product query engine. Every other crate
//! depends on this one. Behaviour here is limited to validation and
//! canonical encoding; filtering, sorting and caching live elsewhere.

use chrono::{DateTime, Utc};

pub mod config;
pub mod criteria;
pub mod error;
pub mod product;
pub mod query;

pub use config::EngineConfig;
pub use criteria::{ActiveFilter, FilterCriteria, FilterUpdate, PriceRange};
pub use error::{
    ConfigError, QueryError, ShopfrontError, ShopfrontResult, StorageError, ValidationError,
};
pub use product::{Product, ProductFlags};
pub use query::{PageRequest, QuerySignature, SearchQuery, SortKey};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Stable product identifier, as supplied by the catalogue source.
pub type ProductId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Highest rating a product can carry.
pub const MAX_RATING: f32 = 5.0;
