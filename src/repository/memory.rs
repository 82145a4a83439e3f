//! In-memory storage backend
//!
//! Cloning shares the underlying map, so several coordinators built on
//! clones behave like tabs of one browser profile.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::traits::{StorageBackend, StorageError};

#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    /// Max total bytes of keys and values, like a browser's storage quota
    quota: Option<usize>,
    unavailable: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::default();
        storage.inner.borrow_mut().quota = Some(bytes);
        storage
    }

    /// Make every read and write fail with [`StorageError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.borrow_mut().unavailable = unavailable;
    }

    /// Number of successful `set_item` calls
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Store a raw value without counting it as a write
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.inner.borrow_mut().items.insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        if inner.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.unavailable {
            return Err(StorageError::Unavailable);
        }

        if let Some(quota) = inner.quota {
            let others: usize = inner
                .items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        inner.items.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
