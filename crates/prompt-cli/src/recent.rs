//! Recently used templates, kept in the edit-session cache

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use prompt_cache::{CacheConfig, FileStorage, LruStore};
use prompt_utils::{CacheSettings, Config};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Storage key of the recent-templates cache
pub const STORAGE_KEY: &str = "recent-templates";

/// One cache entry, keyed by template path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTemplate {
    pub action: String,
    pub variables: usize,
    pub touched_at: DateTime<Utc>,
}

pub fn cache_config(settings: &CacheSettings) -> prompt_cache::Result<CacheConfig> {
    let mut builder = CacheConfig::builder()
        .max_size(settings.max_size)
        .storage_key(STORAGE_KEY);
    if let Some(secs) = settings.ttl_secs {
        builder = builder.ttl(Duration::from_secs(secs));
    }
    builder.build()
}

/// Open the cache described by `config.cache`
pub fn open(config: &Config) -> Result<LruStore<RecentTemplate>> {
    let cache_config = cache_config(&config.cache).context("Invalid cache settings")?;

    let store = match &config.cache.storage_dir {
        Some(dir) => {
            let storage = FileStorage::new(dir)
                .with_context(|| format!("Failed to open cache directory {}", dir.display()))?;
            LruStore::with_storage(cache_config, storage)?
        }
        None => LruStore::new(cache_config)?,
    };
    Ok(store)
}

/// Remember that `path` was just used; failures only log
pub fn record(config: &Config, path: &Path, action: &str, variables: usize) {
    let key = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();

    match open(config) {
        Ok(mut store) => store.set(
            key,
            RecentTemplate {
                action: action.to_string(),
                variables,
                touched_at: Utc::now(),
            },
        ),
        Err(e) => tracing::warn!(error = %e, "Recent templates unavailable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.cache.storage_dir = Some(dir.to_path_buf());
        config.cache.max_size = 2;
        config
    }

    #[test]
    fn test_record_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        record(&config, Path::new("a.txt"), "parse", 1);
        record(&config, Path::new("b.txt"), "render", 2);
        record(&config, Path::new("c.txt"), "parse", 3);

        let entries = open(&config).unwrap().get_all();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["c.txt", "b.txt"]);
        assert_eq!(entries[1].1.action, "render");
        assert_eq!(entries[1].1.variables, 2);
    }

    #[test]
    fn test_in_memory_when_no_storage_dir() {
        let mut config = Config::default();
        config.cache.storage_dir = None;

        record(&config, Path::new("a.txt"), "parse", 1);
        assert_eq!(open(&config).unwrap().size(), 0);
    }

    #[test]
    fn test_cache_config_mapping() {
        let settings = CacheSettings {
            max_size: 7,
            ttl_secs: Some(30),
            storage_dir: None,
        };
        let config = cache_config(&settings).unwrap();
        assert_eq!(config.max_size, 7);
        assert_eq!(config.ttl, Some(Duration::from_secs(30)));
        assert_eq!(config.storage_key.as_deref(), Some(STORAGE_KEY));
    }
}
