//! Error types for SHOPFRONT operations

use crate::ProductId;
use thiserror::Error;

/// Key-value persistence errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Key-value store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate product identifier: {id}")]
    DuplicateProductId { id: ProductId },
}

/// Query pipeline errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Malformed product record {id}: {reason}")]
    MalformedProduct { id: ProductId, reason: String },

    #[error("Query pipeline failed during {stage}: {reason}")]
    PipelineFailed { stage: String, reason: String },

    #[error("Unknown sort key: {key}")]
    UnknownSortKey { key: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },
}

/// Master error type for all SHOPFRONT errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShopfrontError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for SHOPFRONT operations.
pub type ShopfrontResult<T> = Result<T, ShopfrontError>;

// =============================================================================
// TESTS
// =============================================================================
