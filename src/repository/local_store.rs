//! Persistent Local Store
//!
//! Best-effort JSON cache of the favorites collection under a single key.
//! Reads fall back to an empty collection, writes swallow their errors: the
//! server is the source of truth, this is only the last-known view.

use std::rc::Rc;

use log::{debug, warn};
use serde_json::Value;

use super::traits::StorageBackend;
use crate::domain::{FavoriteRecord, FavoritesCollection};

#[derive(Clone)]
pub struct LocalStore {
    backend: Rc<dyn StorageBackend>,
    key: String,
}

impl LocalStore {
    pub fn new(backend: Rc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last saved collection; empty on missing key, corrupt JSON or backend failure
    pub fn load(&self) -> FavoritesCollection {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return FavoritesCollection::new(),
            Err(e) => {
                warn!("Reading favorites from storage failed: {}", e);
                return FavoritesCollection::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries
                .iter()
                .filter_map(FavoriteRecord::from_value)
                .collect(),
            Ok(_) => {
                debug!("Stored favorites under {} are not an array, ignoring", self.key);
                FavoritesCollection::new()
            }
            Err(e) => {
                debug!("Stored favorites under {} are not valid JSON: {}", self.key, e);
                FavoritesCollection::new()
            }
        }
    }

    /// Write `items` under the store key, logging instead of failing.
    /// Returns whether the write landed.
    pub fn save(&self, items: &FavoritesCollection) -> bool {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Serializing favorites failed: {}", e);
                return false;
            }
        };

        match self.backend.set_item(&self.key, &raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("Saving {} favorites to storage failed: {}", items.len(), e);
                false
            }
        }
    }
}
