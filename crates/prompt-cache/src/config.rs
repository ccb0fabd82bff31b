//! Configuration for LRU stores

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of entries kept before eviction
pub const DEFAULT_MAX_SIZE: usize = 50;

/// Configuration for an [`LruStore`](crate::LruStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries; the least recently used one is evicted beyond this
    pub max_size: usize,

    /// Entries older than this are treated as absent
    pub ttl: Option<Duration>,

    /// Key under which the whole entry list is persisted
    pub storage_key: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: None,
            storage_key: None,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::Config(
                "max_size must be greater than 0".to_string(),
            ));
        }

        if self.ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(CacheError::Config(
                "ttl must be greater than 0 when set".to_string(),
            ));
        }

        if self
            .storage_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            return Err(CacheError::Config(
                "storage_key must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// TTL in milliseconds, saturating at `i64::MAX`
    pub(crate) fn ttl_millis(&self) -> Option<i64> {
        self.ttl
            .map(|ttl| i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
    }
}

/// Builder for CacheConfig
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    max_size: Option<usize>,
    ttl: Option<Duration>,
    storage_key: Option<String>,
}

impl CacheConfigBuilder {
    /// Set the maximum number of entries
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Set the entry time-to-live
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Persist the store under this key
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<CacheConfig> {
        let config = CacheConfig {
            max_size: self.max_size.unwrap_or(DEFAULT_MAX_SIZE),
            ttl: self.ttl,
            storage_key: self.storage_key,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 50);
        assert!(config.ttl.is_none());
        assert!(config.storage_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::builder()
            .max_size(10)
            .ttl(Duration::from_secs(60))
            .storage_key("recent-templates")
            .build()
            .unwrap();

        assert_eq!(config.max_size, 10);
        assert_eq!(config.ttl_millis(), Some(60_000));
        assert_eq!(config.storage_key.as_deref(), Some("recent-templates"));
    }

    #[test]
    fn test_validation() {
        assert!(CacheConfig::builder().max_size(0).build().is_err());
        assert!(CacheConfig::builder().ttl(Duration::ZERO).build().is_err());
        assert!(CacheConfig::builder().storage_key("  ").build().is_err());
    }
}
