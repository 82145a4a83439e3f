//! Favorites State Store
//!
//! Uses Leptos reactive_stores so views can track the list, the pending ids
//! and the last error separately.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::domain::{FavoriteId, FavoriteRecord, FavoritesCollection, FavoritesError};

/// Reactive mirror of one coordinator
#[derive(Clone, Debug, Default, Store)]
pub struct FavoritesState {
    /// Current view, most recent first
    pub items: Vec<FavoriteRecord>,
    /// Ids with an add/remove awaiting the server
    pub pending: Vec<FavoriteId>,
    /// Message of the last failed remote operation
    pub last_error: Option<String>,
}

impl FavoritesState {
    pub fn new(items: &FavoritesCollection) -> Self {
        Self {
            items: items.to_vec(),
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type FavoritesStore = Store<FavoritesState>;

// ========================
// Store Helper Functions
// ========================

/// Replace the mirrored list
pub fn store_set_items(store: &FavoritesStore, items: &FavoritesCollection) {
    *store.items().write() = items.to_vec();
}

/// Mark `id` as awaiting the server
pub fn store_begin(store: &FavoritesStore, id: &FavoriteId) {
    store.pending().update(|pending| {
        if !pending.contains(id) {
            pending.push(id.clone());
        }
    });
}

/// Clear the pending mark of `id` and record the outcome
pub fn store_finish(
    store: &FavoritesStore,
    id: Option<&FavoriteId>,
    result: Result<(), FavoritesError>,
) {
    // Nothing was applied; the earlier call still owns the id
    if let Err(FavoritesError::Busy { .. }) = result {
        return;
    }
    if let Some(id) = id {
        store.pending().write().retain(|pending| pending != id);
    }
    match result {
        Ok(()) => store.last_error().set(None),
        Err(e) => store.last_error().set(Some(e.to_string())),
    }
}

pub fn store_contains(store: &FavoritesStore, id: &str) -> bool {
    store.items().with(|items| items.iter().any(|item| item.id.as_str() == id))
}

pub fn store_is_pending(store: &FavoritesStore, id: &str) -> bool {
    store.pending().with(|pending| pending.iter().any(|p| p.as_str() == id))
}

pub fn store_items(store: &FavoritesStore) -> Vec<FavoriteRecord> {
    store.items().get()
}

pub fn store_last_error(store: &FavoritesStore) -> Option<String> {
    store.last_error().get()
}
