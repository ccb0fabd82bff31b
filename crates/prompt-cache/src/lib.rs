//! Edit-session cache for prompt-rs
//!
//! A bounded LRU map with optional TTL that can persist itself through a
//! [`Storage`] backend, so recently edited templates survive a restart.
//!
//! # Quick Start
//!
//! ```
//! use prompt_cache::{CacheConfig, LruStore, MemoryStorage};
//! use std::time::Duration;
//!
//! let storage = MemoryStorage::new();
//! let config = CacheConfig::builder()
//!     .max_size(20)
//!     .ttl(Duration::from_secs(3600))
//!     .storage_key("recent-templates")
//!     .build()?;
//!
//! let mut store = LruStore::with_storage(config.clone(), storage.clone())?;
//! store.set("greeting", "Hello {{name}}!".to_string());
//!
//! // A second store over the same storage sees the persisted entry
//! let mut reopened: LruStore<String> = LruStore::with_storage(config, storage)?;
//! assert_eq!(reopened.get("greeting").as_deref(), Some("Hello {{name}}!"));
//! # Ok::<(), prompt_cache::CacheError>(())
//! ```

mod config;
mod error;
mod storage;
mod store;

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_MAX_SIZE};
pub use error::{CacheError, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::LruStore;
