//! Key-value storage backends used for cache persistence

use crate::error::{CacheError, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Durable string key-value store
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    /// Read an item, `None` when it was never written
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite an item
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete an item; deleting a missing item is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-process storage
///
/// Clones share the same map, so two stores built over clones of one
/// `MemoryStorage` see each other's persisted state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().map_or(0, |items| items.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Storage("memory storage lock poisoned".to_string())
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().map_err(poisoned)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a base directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create the storage, creating `base_dir` if needed
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// File backing `key`
    ///
    /// `[A-Za-z0-9-]` is kept; every other byte becomes `_` plus two hex
    /// digits, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut stem = String::with_capacity(key.len());
        for c in key.chars() {
            if c.is_ascii_alphanumeric() || c == '-' {
                stem.push(c);
            } else {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(stem, "_{byte:02x}");
                }
            }
        }
        self.base_dir.join(format!("{stem}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
