//! Favorites Context
//!
//! Shares one coordinator with every component via the Leptos Context API
//! and mirrors its view into a [`FavoritesStore`].

use std::future::Future;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use log::warn;
use reactive_stores::Store;

use crate::coordinator::Favorites;
use crate::domain::{FavoriteId, FavoriteRecord, FavoritesResult};
use crate::store::{
    store_begin, store_contains, store_finish, store_is_pending, store_items, store_last_error,
    store_set_items, FavoritesState, FavoritesStore,
};

/// Favorites handle provided via context
#[derive(Clone, Copy)]
pub struct FavoritesContext {
    /// The coordinator is `!Send`, so it lives in local arena storage
    handle: StoredValue<Favorites, LocalStorage>,
    /// Reactive mirror of the coordinator's view
    pub store: FavoritesStore,
}

impl FavoritesContext {
    pub fn new(favorites: Favorites) -> Self {
        let store = Store::new(FavoritesState::new(&favorites.items()));
        let listener = favorites.on_change(move |items| store_set_items(&store, items));
        let handle = StoredValue::new_local(favorites);

        on_cleanup(move || {
            handle.try_with_value(|favorites| favorites.remove_listener(listener));
        });

        Self { handle, store }
    }

    /// A clone of the underlying coordinator
    pub fn favorites(&self) -> Favorites {
        self.handle.get_value()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        store_contains(&self.store, id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        store_is_pending(&self.store, id)
    }

    pub fn items(&self) -> Vec<FavoriteRecord> {
        store_items(&self.store)
    }

    pub fn last_error(&self) -> Option<String> {
        store_last_error(&self.store)
    }

    // ========================
    // Actions
    // ========================

    pub fn add(&self, record: FavoriteRecord) {
        let id = record.id.clone();
        self.run(Some(id), move |favorites| async move { favorites.add(record).await });
    }

    pub fn remove(&self, id: impl Into<FavoriteId>) {
        let id = id.into();
        let target = id.clone();
        self.run(Some(id), move |favorites| async move { favorites.remove(target).await });
    }

    pub fn toggle(&self, record: FavoriteRecord) {
        let id = record.id.clone();
        self.run(Some(id), move |favorites| async move {
            favorites.toggle(record).await.map(|_| ())
        });
    }

    pub fn clear(&self) {
        self.handle.with_value(|favorites| favorites.clear());
    }

    pub fn clear_server(&self) {
        self.run(None, |favorites| async move { favorites.clear_server().await });
    }

    pub fn refresh(&self) {
        self.run(None, |favorites| async move { favorites.refresh().await });
    }

    /// Spawn `operation` and record its outcome in the store
    fn run<F, Fut>(&self, id: Option<FavoriteId>, operation: F)
    where
        F: FnOnce(Favorites) -> Fut + 'static,
        Fut: Future<Output = FavoritesResult<()>> + 'static,
    {
        spawn_local(self.tracked(id, operation));
    }

    /// Marks `id` pending right away; the returned future runs `operation`
    /// and settles the pending mark and last error.
    fn tracked<F, Fut>(
        &self,
        id: Option<FavoriteId>,
        operation: F,
    ) -> impl Future<Output = ()> + 'static
    where
        F: FnOnce(Favorites) -> Fut + 'static,
        Fut: Future<Output = FavoritesResult<()>> + 'static,
    {
        let store = self.store;
        let favorites = self.favorites();
        if let Some(id) = &id {
            store_begin(&store, id);
        }

        async move {
            let result = operation(favorites).await;
            if let Err(e) = &result {
                warn!("Favorites action failed: {}", e);
            }
            store_finish(&store, id.as_ref(), result);
        }
    }
}

/// Provide `favorites` to all children
pub fn provide_favorites(favorites: Favorites) -> FavoritesContext {
    let context = FavoritesContext::new(favorites);
    provide_context(context);
    context
}

/// Get the favorites from context
pub fn use_favorites() -> FavoritesContext {
    expect_context::<FavoritesContext>()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::notify::BroadcastHub;
    use crate::remote::{FavoritesRemote, HttpFavoritesClient};
    use crate::repository::{LocalStore, MemoryStorage};

    const KEY: &str = "fav:restaurants:v1";
    const EVENT: &str = "fav:update";

    fn reactive_owner() -> Owner {
        let owner = Owner::new();
        owner.set();
        owner
    }

    /// Client pointed at a port nobody listens on
    async fn unreachable_remote() -> Rc<dyn FavoritesRemote> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        Rc::new(HttpFavoritesClient::new(format!("http://{}", addr)).expect("client"))
    }

    fn open_tab(
        storage: &MemoryStorage,
        hub: &BroadcastHub,
        remote: Rc<dyn FavoritesRemote>,
    ) -> Favorites {
        let store = LocalStore::new(Rc::new(storage.clone()), KEY);
        Favorites::new(store, Rc::new(hub.context(KEY, EVENT)), remote)
    }

    #[tokio::test]
    async fn test_store_mirrors_coordinator_changes() {
        let _owner = reactive_owner();
        let storage = MemoryStorage::new();
        storage.insert_raw(KEY, r#"[{"id":"1","name":"one","rating":1},{"id":"2","name":"two"}]"#);
        let hub = BroadcastHub::new();
        let remote = unreachable_remote().await;

        let context = FavoritesContext::new(open_tab(&storage, &hub, remote.clone()));
        assert!(context.is_favorite("1"));
        assert_eq!(context.items().len(), 2);

        // Another tab evicts its cache
        let other_tab = open_tab(&storage, &hub, remote);
        other_tab.clear();
        assert!(context.items().is_empty());
    }

    #[tokio::test]
    async fn test_failed_action_records_error_and_rolls_back() {
        let _owner = reactive_owner();
        let storage = MemoryStorage::new();
        let hub = BroadcastHub::new();
        let context = FavoritesContext::new(open_tab(&storage, &hub, unreachable_remote().await));

        let record = FavoriteRecord::new("7", "A").with_rating(4.2);
        let action = context.tracked(Some(FavoriteId::from("7")), move |favorites| async move {
            favorites.add(record).await
        });
        assert!(context.is_pending("7"));
        assert_eq!(context.last_error(), None);

        action.await;

        assert!(!context.is_pending("7"));
        assert!(!context.is_favorite("7"));
        assert!(context.last_error().is_some_and(|e| e.starts_with("HTTP error")));
    }

    #[tokio::test]
    async fn test_disposing_owner_unregisters_listener() {
        let owner = reactive_owner();
        let storage = MemoryStorage::new();
        let hub = BroadcastHub::new();
        let favorites = open_tab(&storage, &hub, unreachable_remote().await);

        let _context = FavoritesContext::new(favorites.clone());
        assert_eq!(favorites.listener_count(), 1);

        owner.cleanup();

        assert_eq!(favorites.listener_count(), 0);
        // Must not touch the disposed store
        favorites.clear();
    }
}
