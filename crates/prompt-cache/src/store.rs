//! LRU store with optional TTL and persistence

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::storage::Storage;
use chrono::Utc;
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Persisted form of one entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry<V> {
    key: String,
    value: V,
    /// Milliseconds since the Unix epoch at the last write
    timestamp: i64,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    timestamp: i64,
}

impl<V> Entry<V> {
    fn is_expired(&self, ttl_ms: Option<i64>, now: i64) -> bool {
        ttl_ms.is_some_and(|ttl| now.saturating_sub(self.timestamp) > ttl)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Bounded least-recently-used map with optional expiry
///
/// Reads refresh recency, so a `get` protects a key from the next eviction.
/// With a storage backend and a `storage_key`, the entry list is written after
/// every change and reloaded on construction. Storage failures are logged and
/// never fail an operation.
///
/// The store has a single writer; two stores over the same storage key simply
/// overwrite each other's snapshot.
///
/// # Examples
///
/// ```
/// use prompt_cache::{CacheConfig, LruStore};
///
/// let config = CacheConfig::builder().max_size(2).build()?;
/// let mut store = LruStore::new(config)?;
///
/// store.set("a", 1);
/// store.set("b", 2);
/// store.get("a");
/// store.set("c", 3);
///
/// assert!(store.has("a"));
/// assert!(!store.has("b"));
/// assert_eq!(store.keys(), vec!["c", "a"]);
/// # Ok::<(), prompt_cache::CacheError>(())
/// ```
pub struct LruStore<V> {
    entries: LruCache<String, Entry<V>>,
    config: CacheConfig,
    storage: Option<Box<dyn Storage>>,
}

impl<V> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("config", &self.config)
            .field("len", &self.entries.len())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl<V> LruStore<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// In-memory store
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.max_size)
            .ok_or_else(|| CacheError::Config("max_size must be greater than 0".to_string()))?;

        Ok(Self {
            entries: LruCache::new(capacity),
            config,
            storage: None,
        })
    }

    /// Persistent store, restored from `storage` under `config.storage_key`
    ///
    /// Expired entries and entries beyond `max_size` are dropped on restore. An
    /// unreadable snapshot is logged and the store starts empty.
    pub fn with_storage(config: CacheConfig, storage: impl Storage + 'static) -> Result<Self> {
        if config.storage_key.is_none() {
            return Err(CacheError::Config(
                "storage_key is required for a persistent store".to_string(),
            ));
        }

        let mut store = Self::new(config)?;
        store.storage = Some(Box::new(storage));
        store.restore();
        Ok(store)
    }

    /// Settings the store was opened with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Value for `key`, refreshing its recency
    pub fn get(&mut self, key: &str) -> Option<V> {
        if self.purge_if_expired(key) {
            return None;
        }

        let value = self.entries.get(key).map(|entry| entry.value.clone());
        if value.is_some() {
            self.persist();
        }
        value
    }

    /// Insert or overwrite `key`, making it the most recently used entry
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let entry = Entry {
            value,
            timestamp: now_millis(),
        };

        if let Some((evicted, _)) = self.entries.push(key.clone(), entry) {
            if evicted != key {
                tracing::debug!(key = %evicted, "Evicted least recently used entry");
            }
        }
        self.persist();
    }

    /// Remove `key`, returning its value when present and fresh
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let ttl = self.config.ttl_millis();
        let removed = self.entries.pop(key)?;
        self.persist();
        (!removed.is_expired(ttl, now_millis())).then_some(removed.value)
    }

    /// Drop every entry and the persisted snapshot
    pub fn clear(&mut self) {
        self.entries.clear();
        if let (Some(storage), Some(key)) = (&self.storage, &self.config.storage_key) {
            if let Err(e) = storage.remove_item(key) {
                tracing::warn!(storage_key = %key, error = %e, "Failed to clear persisted cache");
            }
        }
    }

    /// Whether `key` holds a fresh value; does not refresh recency
    pub fn has(&mut self, key: &str) -> bool {
        !self.purge_if_expired(key) && self.entries.contains(key)
    }

    /// Fresh entries, most recently used first
    pub fn get_all(&mut self) -> Vec<(String, V)> {
        self.purge_expired();
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Number of fresh entries
    pub fn size(&self) -> usize {
        let ttl = self.config.ttl_millis();
        let now = now_millis();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(ttl, now))
            .count()
    }

    /// Fresh keys, most recently used first
    pub fn keys(&mut self) -> Vec<String> {
        self.purge_expired();
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Drop `key` if it has expired; returns whether it was dropped
    fn purge_if_expired(&mut self, key: &str) -> bool {
        let ttl = self.config.ttl_millis();
        let expired = self
            .entries
            .peek(key)
            .is_some_and(|entry| entry.is_expired(ttl, now_millis()));

        if expired {
            self.entries.pop(key);
            tracing::debug!(key, "Dropped expired entry");
            self.persist();
        }
        expired
    }

    fn purge_expired(&mut self) {
        let ttl = self.config.ttl_millis();
        if ttl.is_none() {
            return;
        }

        let now = now_millis();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        if expired.is_empty() {
            return;
        }
        for key in &expired {
            self.entries.pop(key);
        }
        tracing::debug!(count = expired.len(), "Dropped expired entries");
        self.persist();
    }

    /// Write the entry list, least recently used first
    fn persist(&self) {
        let (Some(storage), Some(key)) = (&self.storage, &self.config.storage_key) else {
            return;
        };

        let snapshot: Vec<StoredEntry<&V>> = self
            .entries
            .iter()
            .rev()
            .map(|(name, entry)| StoredEntry {
                key: name.clone(),
                value: &entry.value,
                timestamp: entry.timestamp,
            })
            .collect();

        let result = serde_json::to_string(&snapshot)
            .map_err(CacheError::from)
            .and_then(|json| storage.set_item(key, &json));
        if let Err(e) = result {
            tracing::warn!(storage_key = %key, error = %e, "Failed to persist cache");
        }
    }

    fn restore(&mut self) {
        let (Some(storage), Some(key)) = (&self.storage, &self.config.storage_key) else {
            return;
        };

        let stored: Vec<StoredEntry<V>> = match storage.get_item(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(storage_key = %key, error = %e, "Ignoring unreadable cache snapshot");
                    return;
                }
            },
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(storage_key = %key, error = %e, "Failed to load persisted cache");
                return;
            }
        };

        let total = stored.len();
        let ttl = self.config.ttl_millis();
        let now = now_millis();
        for item in stored {
            let entry = Entry {
                value: item.value,
                timestamp: item.timestamp,
            };
            if !entry.is_expired(ttl, now) {
                self.entries.push(item.key, entry);
            }
        }

        let restored = self.entries.len();
        tracing::debug!(restored, dropped = total - restored, "Restored cache");
        if restored != total {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage, MockStorage};
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn store(max_size: usize) -> LruStore<String> {
        LruStore::new(CacheConfig::builder().max_size(max_size).build().unwrap()).unwrap()
    }

    fn persistent(storage: MemoryStorage) -> LruStore<String> {
        let config = CacheConfig::builder()
            .max_size(3)
            .storage_key("recent")
            .build()
            .unwrap();
        LruStore::with_storage(config, storage).unwrap()
    }

    #[test]
    fn test_basic_operations() {
        let mut store = store(10);
        assert_eq!(store.size(), 0);

        store.set("a", "1".to_string());
        store.set("b", "2".to_string());
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert!(store.has("b"));
        assert_eq!(store.size(), 2);

        store.set("a", "updated".to_string());
        assert_eq!(store.get("a").as_deref(), Some("updated"));
        assert_eq!(store.size(), 2);

        assert_eq!(store.remove("a").as_deref(), Some("updated"));
        assert!(store.remove("a").is_none());
        assert!(!store.has("a"));

        store.clear();
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut store = store(2);
        store.set("a", "1".to_string());
        store.set("b", "2".to_string());
        store.set("c", "3".to_string());

        assert!(!store.has("a"));
        assert!(store.has("b"));
        assert!(store.has("c"));
    }

    #[test]
    fn test_get_protects_from_eviction() {
        let mut store = store(2);
        store.set("a", "1".to_string());
        store.set("b", "2".to_string());
        store.get("a");
        store.set("c", "3".to_string());

        assert!(store.has("a"));
        assert!(!store.has("b"));
        assert_eq!(store.keys(), vec!["c", "a"]);
    }

    #[test]
    fn test_has_does_not_refresh() {
        let mut store = store(2);
        store.set("a", "1".to_string());
        store.set("b", "2".to_string());
        assert!(store.has("a"));
        store.set("c", "3".to_string());

        assert!(!store.has("a"));
    }

    #[test]
    fn test_ttl_expiry() {
        let config = CacheConfig::builder()
            .ttl(Duration::from_millis(30))
            .build()
            .unwrap();
        let mut store: LruStore<String> = LruStore::new(config).unwrap();
        store.set("a", "1".to_string());
        assert!(store.has("a"));

        sleep(Duration::from_millis(80));

        assert_eq!(store.size(), 0);
        assert!(store.get("a").is_none());
        assert!(store.get_all().is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_get_all_order() {
        let mut store = store(5);
        store.set("a", "1".to_string());
        store.set("b", "2".to_string());
        store.get("a");

        let all = store.get_all();
        assert_eq!(
            all,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_persistence_restores_entries_and_order() {
        let storage = MemoryStorage::new();
        {
            let mut store = persistent(storage.clone());
            store.set("a", "1".to_string());
            store.set("b", "2".to_string());
            store.get("a");
        }

        let mut restored = persistent(storage);
        assert_eq!(restored.keys(), vec!["a", "b"]);
        assert_eq!(restored.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_persistence_with_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig::builder()
            .storage_key("templates")
            .build()
            .unwrap();

        {
            let storage = FileStorage::new(dir.path()).unwrap();
            let mut store: LruStore<String> =
                LruStore::with_storage(config.clone(), storage).unwrap();
            store.set("greeting.txt", "Hello {{name}}".to_string());
        }

        let storage = FileStorage::new(dir.path()).unwrap();
        let mut store: LruStore<String> = LruStore::with_storage(config, storage).unwrap();
        assert_eq!(store.get("greeting.txt").as_deref(), Some("Hello {{name}}"));
    }

    #[test]
    fn test_restore_drops_stale_and_overflow() {
        let storage = MemoryStorage::new();
        let now = now_millis();
        let snapshot = json!([
            { "key": "stale", "value": "x", "timestamp": 0 },
            { "key": "a", "value": "1", "timestamp": now },
            { "key": "b", "value": "2", "timestamp": now },
            { "key": "c", "value": "3", "timestamp": now },
        ]);
        storage.set_item("recent", &snapshot.to_string()).unwrap();

        let config = CacheConfig::builder()
            .max_size(2)
            .ttl(Duration::from_secs(3600))
            .storage_key("recent")
            .build()
            .unwrap();
        let mut store: LruStore<String> = LruStore::with_storage(config, storage.clone()).unwrap();

        assert_eq!(store.keys(), vec!["c", "b"]);

        let persisted: serde_json::Value =
            serde_json::from_str(&storage.get_item("recent").unwrap().unwrap()).unwrap();
        assert_eq!(persisted.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unreadable_snapshot_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("recent", "not json").unwrap();

        let mut store = persistent(storage);
        assert!(store.keys().is_empty());
        store.set("a", "1".to_string());
        assert!(store.has("a"));
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let storage = MemoryStorage::new();
        let mut store = persistent(storage.clone());
        store.set("a", "1".to_string());
        assert!(storage.get_item("recent").unwrap().is_some());

        store.clear();
        assert!(storage.get_item("recent").unwrap().is_none());
    }

    #[test]
    fn test_writes_through_storage() {
        let mut storage = MockStorage::new();
        storage.expect_get_item().times(1).returning(|_| Ok(None));
        storage
            .expect_set_item()
            .withf(|key, value| key == "recent" && value.contains("\"key\":\"a\""))
            .times(2)
            .returning(|_, _| Ok(()));
        storage
            .expect_remove_item()
            .withf(|key| key == "recent")
            .times(1)
            .returning(|_| Ok(()));

        let config = CacheConfig::builder().storage_key("recent").build().unwrap();
        let mut store: LruStore<String> = LruStore::with_storage(config, storage).unwrap();
        store.set("a", "1".to_string());
        store.get("a");
        store.get("missing");
        store.clear();
    }

    #[test]
    fn test_storage_failures_are_not_fatal() {
        let mut storage = MockStorage::new();
        storage
            .expect_get_item()
            .returning(|_| Err(CacheError::Storage("offline".to_string())));
        storage
            .expect_set_item()
            .returning(|_, _| Err(CacheError::Storage("offline".to_string())));

        let config = CacheConfig::builder().storage_key("recent").build().unwrap();
        let mut store: LruStore<String> = LruStore::with_storage(config, storage).unwrap();
        store.set("a", "1".to_string());
        assert_eq!(store.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_storage_requires_key() {
        let result: Result<LruStore<String>> =
            LruStore::with_storage(CacheConfig::default(), MemoryStorage::new());
        assert!(matches!(result, Err(CacheError::Config(_))));
    }
}
