//! Engine configuration.
//!
//! Loaded from a TOML file, from `SHOPFRONT_*` environment variables, or
//! built in code. Every field has a default matching the storefront's
//! reference behaviour.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for one query engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum search term length (in characters) before search takes effect.
    pub min_search_len: usize,
    /// Products per page.
    pub page_size: usize,
    /// Maximum number of memoized query results.
    pub cache_capacity: usize,
    /// Maximum number of remembered search terms.
    pub history_limit: usize,
    /// Delay before a debounced refresh runs, in milliseconds.
    pub debounce_ms: u64,
    /// Key under which the search history is persisted.
    pub history_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_search_len: 2,
            page_size: 12,
            cache_capacity: 50,
            history_limit: 10,
            debounce_ms: 300,
            history_key: "searchHistory".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_search_len(mut self, len: usize) -> Self {
        self.min_search_len = len;
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_history_key(mut self, key: impl Into<String>) -> Self {
        self.history_key = key.into();
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Create EngineConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SHOPFRONT_MIN_SEARCH_LEN` (default: 2)
    /// - `SHOPFRONT_PAGE_SIZE` (default: 12)
    /// - `SHOPFRONT_CACHE_CAPACITY` (default: 50)
    /// - `SHOPFRONT_HISTORY_LIMIT` (default: 10)
    /// - `SHOPFRONT_DEBOUNCE_MS` (default: 300)
    /// - `SHOPFRONT_HISTORY_KEY` (default: "searchHistory")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            min_search_len: parse_var(&lookup, "SHOPFRONT_MIN_SEARCH_LEN", defaults.min_search_len)?,
            page_size: parse_var(&lookup, "SHOPFRONT_PAGE_SIZE", defaults.page_size)?,
            cache_capacity: parse_var(&lookup, "SHOPFRONT_CACHE_CAPACITY", defaults.cache_capacity)?,
            history_limit: parse_var(&lookup, "SHOPFRONT_HISTORY_LIMIT", defaults.history_limit)?,
            debounce_ms: parse_var(&lookup, "SHOPFRONT_DEBOUNCE_MS", defaults.debounce_ms)?,
            history_key: lookup("SHOPFRONT_HISTORY_KEY")
                .map(|s| s.trim().to_string())
                .unwrap_or(defaults.history_key),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - page_size > 0
    /// - cache_capacity > 0
    /// - history_key is not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                value: self.page_size.to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity".to_string(),
                value: self.cache_capacity.to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.history_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "history_key".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: name.to_string(),
            value: raw.clone(),
            reason: "not a valid number".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_search_len, 2);
        assert_eq!(config.cache_capacity, 50);
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_page_size(24)
            .with_cache_capacity(5)
            .with_history_limit(3)
            .with_debounce(Duration::from_millis(150))
            .with_history_key("recent");

        assert_eq!(config.page_size, 24);
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.history_key, "recent");
    }

    #[test]
    fn test_with_debounce_saturates() {
        let config = EngineConfig::new().with_debounce(Duration::MAX);
        assert_eq!(config.debounce_ms, u64::MAX);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let err = EngineConfig::new().with_page_size(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "page_size"));
    }

    #[test]
    fn test_validate_rejects_zero_cache_capacity() {
        assert!(EngineConfig::new().with_cache_capacity(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_history_key() {
        let err = EngineConfig::new().with_history_key("  ").validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    fn test_from_toml_partial_document() {
        let config = EngineConfig::from_toml_str("page_size = 6\ndebounce_ms = 50\n").unwrap();
        assert_eq!(config.page_size, 6);
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.cache_capacity, 50);
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        let err = EngineConfig::from_toml_str("page_sise = 6\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "history_limit = 4\n").unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.history_limit, 4);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = EngineConfig::from_path(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SHOPFRONT_PAGE_SIZE", "8"),
            ("SHOPFRONT_HISTORY_KEY", " recent "),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.page_size, 8);
        assert_eq!(config.history_key, "recent");
        assert_eq!(config.min_search_len, 2);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = EngineConfig::from_lookup(|k| {
            (k == "SHOPFRONT_CACHE_CAPACITY").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "SHOPFRONT_CACHE_CAPACITY"
        ));
    }
}
