//! Favorites Coordinator
//!
//! Owns the in-memory view of the favorites and drives every change to it.
//!
//! Remote-backed mutations are optimistic:
//! 1. snapshot the current view
//! 2. apply the change in memory
//! 3. persist to the local store and broadcast
//! 4. call the remote store
//! 5. on failure restore the snapshot (persist + broadcast again) and
//!    return the error
//!
//! Signals from the notifier make the coordinator reload from the local
//! store. Such a reload is flagged as externally sourced, which skips the
//! persistence step of that one transition so tabs don't echo each other.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::domain::{
    FavoriteId, FavoriteRecord, FavoritesCollection, FavoritesError, FavoritesResult,
};
use crate::notify::{ChangeNotifier, ChangeSource, Subscription};
use crate::remote::FavoritesRemote;
use crate::repository::LocalStore;


/// Observer of view transitions
pub type Listener = Rc<dyn Fn(&FavoritesCollection)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Handle to one context's favorites. Clones share the same state.
#[derive(Clone)]
pub struct Favorites {
    shared: Rc<Shared>,
    _subscription: Rc<Subscription>,
}

struct Shared {
    state: RefCell<State>,
    store: LocalStore,
    notifier: Rc<dyn ChangeNotifier>,
    remote: Rc<dyn FavoritesRemote>,
}

#[derive(Default)]
struct State {
    items: FavoritesCollection,
    /// Next transition came from storage; don't persist it
    syncing_from_storage: bool,
    /// Depth of our own emissions in progress
    broadcasting: u32,
    /// Whether the last `persist` actually reached storage
    last_write_landed: bool,
    initialized: bool,
    in_flight: HashSet<FavoriteId>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl Favorites {
    /// Bootstrap from the local store and start listening for changes.
    ///
    /// Nothing is fetched yet; call [`Favorites::initialize`] once.
    pub fn new(
        store: LocalStore,
        notifier: Rc<dyn ChangeNotifier>,
        remote: Rc<dyn FavoritesRemote>,
    ) -> Self {
        let items = store.load();
        debug!("Bootstrapped {} favorites from {}", items.len(), store.key());

        let shared = Rc::new(Shared {
            state: RefCell::new(State {
                items,
                ..Default::default()
            }),
            store,
            notifier,
            remote,
        });

        let weak = Rc::downgrade(&shared);
        let subscription = shared.notifier.subscribe(Rc::new(move |source: ChangeSource| {
            if let Some(shared) = weak.upgrade() {
                shared.reload_from_storage(source);
            }
        }));

        Self {
            shared,
            _subscription: Rc::new(subscription),
        }
    }

    /// Replace the bootstrapped view with the server's, once per coordinator.
    ///
    /// A successful empty answer wipes the cached view: the server is the
    /// eventual source of truth. Later calls return `Ok(())` without fetching.
    pub async fn initialize(&self) -> FavoritesResult<()> {
        let first = {
            let mut state = self.shared.state.borrow_mut();
            !std::mem::replace(&mut state.initialized, true)
        };
        if !first {
            return Ok(());
        }
        self.refresh().await
    }

    // ========================
    // Reads
    // ========================

    pub fn items(&self) -> FavoritesCollection {
        self.shared.snapshot()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.shared.state.borrow().items.contains(id)
    }

    pub fn len(&self) -> usize {
        self.shared.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.borrow().items.is_empty()
    }

    /// Whether an add/remove for `id` is awaiting the server
    pub fn is_pending(&self, id: &str) -> bool {
        self.shared.state.borrow().in_flight.contains(id)
    }

    // ========================
    // Mutations
    // ========================

    /// Add (or replace) a favorite at the front, then upsert it remotely
    pub async fn add(&self, record: FavoriteRecord) -> FavoritesResult<()> {
        let _guard = self.shared.begin(&record.id)?;
        let snapshot = self.shared.snapshot();

        let mut next = snapshot.clone();
        next.insert_front(record.clone());
        self.shared.commit(next);

        let result = self.shared.remote.upsert(&record).await;
        self.shared.settle("add", result, snapshot)
    }

    /// Drop a favorite, then delete it remotely (even if it was not present)
    pub async fn remove(&self, id: impl Into<FavoriteId>) -> FavoritesResult<()> {
        let id = id.into();
        let _guard = self.shared.begin(&id)?;
        let snapshot = self.shared.snapshot();

        let mut next = snapshot.clone();
        next.remove(id.as_str());
        self.shared.commit(next);

        let result = self.shared.remote.delete_by_id(id.as_str()).await;
        self.shared.settle("remove", result, snapshot)
    }

    /// Remove when present, add otherwise. Returns whether it is now a favorite.
    pub async fn toggle(&self, record: FavoriteRecord) -> FavoritesResult<bool> {
        if self.is_favorite(record.id.as_str()) {
            self.remove(record.id).await.map(|_| false)
        } else {
            self.add(record).await.map(|_| true)
        }
    }

    /// Evict the local cache. Never touches the server, never fails.
    pub fn clear(&self) {
        info!("Clearing local favorites cache");
        self.shared.commit(FavoritesCollection::new());
    }

    /// Empty the view, then delete everything on the server
    pub async fn clear_server(&self) -> FavoritesResult<()> {
        let snapshot = self.shared.snapshot();
        self.shared.commit(FavoritesCollection::new());

        let result = self.shared.remote.delete_all().await;
        self.shared.settle("clear on server", result, snapshot)
    }

    /// Replace the view with the server's list; on failure keep the current view
    pub async fn refresh(&self) -> FavoritesResult<()> {
        match self.shared.remote.list().await {
            Ok(records) => {
                let items = FavoritesCollection::from_records(records);
                info!("Refreshed {} favorites from server", items.len());
                self.shared.commit(items);
                Ok(())
            }
            Err(e) => {
                warn!("Refreshing favorites failed, keeping current view: {}", e);
                Err(e)
            }
        }
    }

    // ========================
    // Observers
    // ========================

    /// Call `listener` after every change of the view, whatever its origin
    pub fn on_change(&self, listener: impl Fn(&FavoritesCollection) + 'static) -> ListenerId {
        let mut state = self.shared.state.borrow_mut();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn listener_count(&self) -> usize {
        self.shared.state.borrow().listeners.len()
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.shared.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(listener_id, _)| *listener_id != id);
        state.listeners.len() != before
    }
}

/// Releases the per-id in-flight slot
struct InFlight {
    shared: Rc<Shared>,
    id: FavoriteId,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.shared.state.borrow_mut().in_flight.remove(&self.id);
    }
}

impl Shared {
    fn snapshot(&self) -> FavoritesCollection {
        self.state.borrow().items.clone()
    }

    /// Claim `id` for one outstanding mutation
    fn begin(self: &Rc<Self>, id: &FavoriteId) -> FavoritesResult<InFlight> {
        if !self.state.borrow_mut().in_flight.insert(id.clone()) {
            debug!("Rejecting mutation of {}: another one is in flight", id);
            return Err(FavoritesError::Busy { id: id.clone() });
        }
        Ok(InFlight {
            shared: self.clone(),
            id: id.clone(),
        })
    }

    /// Apply a view transition: persist + broadcast unless it came from storage
    fn commit(&self, next: FavoritesCollection) {
        let (persist, listeners) = {
            let mut state = self.state.borrow_mut();
            state.items = next;
            let from_storage = std::mem::take(&mut state.syncing_from_storage);
            let listeners: Vec<Listener> = state.listeners.iter().map(|(_, l)| l.clone()).collect();
            (!from_storage, listeners)
        };

        if persist {
            self.persist();
        }

        if !listeners.is_empty() {
            let items = self.snapshot();
            for listener in listeners {
                listener(&items);
            }
        }
    }

    fn persist(&self) {
        let items = self.snapshot();
        let landed = self.store.save(&items);

        {
            let mut state = self.state.borrow_mut();
            state.broadcasting += 1;
            state.last_write_landed = landed;
        }
        self.notifier.notify();
        self.state.borrow_mut().broadcasting -= 1;
    }

    /// While we are emitting, a same-context signal is our own echo unless
    /// storage no longer holds our view. A failed write leaves nothing to
    /// compare against, so the view is kept.
    fn is_own_echo(&self, source: ChangeSource, stored: &FavoritesCollection) -> bool {
        let state = self.state.borrow();
        source == ChangeSource::SameContext
            && state.broadcasting > 0
            && (!state.last_write_landed || *stored == state.items)
    }

    fn reload_from_storage(&self, source: ChangeSource) {
        let items = self.store.load();
        if self.is_own_echo(source, &items) {
            return;
        }

        debug!("Reloading {} favorites after {:?} change", items.len(), source);
        self.state.borrow_mut().syncing_from_storage = true;
        self.commit(items);
    }

    /// Step 5: keep the optimistic view on success, restore `snapshot` on failure
    fn settle(
        &self,
        operation: &str,
        result: FavoritesResult<()>,
        snapshot: FavoritesCollection,
    ) -> FavoritesResult<()> {
        if let Err(e) = &result {
            warn!("Favorites {} failed, rolling back: {}", operation, e);
            self.commit(snapshot);
        }
        result
    }
}
