//! Repository Layer - Core Traits
//!
//! Defines the key-value interface the favorites cache persists through.
//! Implementations: browser localStorage, in-memory map.

use thiserror::Error;

/// Failures of a storage backend. Never surfaced past [`super::LocalStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Synchronous string key-value storage scoped to one profile
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
