//! Favorites Sync
//!
//! Local-first favorites for a restaurant-discovery frontend: an ordered,
//! id-unique collection cached in localStorage, kept in step across tabs,
//! and reconciled with a remote store through optimistic mutations that
//! roll back when the server refuses them.

pub mod browser;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod domain;
pub mod notify;
pub mod remote;
pub mod repository;
pub mod store;

pub use config::FavoritesConfig;
pub use context::{provide_favorites, use_favorites, FavoritesContext};
pub use coordinator::{Favorites, Listener, ListenerId};
pub use domain::{
    FavoriteId, FavoriteRecord, FavoritesCollection, FavoritesError, FavoritesResult,
};
pub use notify::{
    BroadcastHub, BrowserNotifier, ChangeNotifier, ChangeSource, LocalNotifier, Subscription,
};
pub use remote::{FavoritesRemote, HttpFavoritesClient};
pub use repository::{BrowserStorage, LocalStore, MemoryStorage, StorageBackend, StorageError};
