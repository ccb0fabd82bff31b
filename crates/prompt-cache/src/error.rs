//! Error types for cache operations

use thiserror::Error;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised by cache construction and storage backends
///
/// Cache reads and writes never surface these; persistence failures are
/// logged and the in-memory state stays authoritative.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Invalid cache configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A storage backend rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted entries could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File-backed storage failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
