//! In-process model of a browser profile's event plumbing.
//!
//! A [`BroadcastHub`] plays the role of the shared storage's change feed;
//! each [`LocalNotifier`] it hands out is one execution context (a tab).
//! Like the real thing, the storage channel only reaches *other* contexts
//! listening on the same key, and the local event only reaches the emitting
//! context.

use std::cell::RefCell;
use std::rc::Rc;

use super::{ChangeCallback, ChangeNotifier, ChangeSource, Subscription};

#[derive(Clone, Default)]
pub struct BroadcastHub {
    inner: Rc<RefCell<HubInner>>,
}

#[derive(Default)]
struct HubInner {
    next_context: u64,
    next_listener: u64,
    listeners: Vec<HubListener>,
}

struct HubListener {
    id: u64,
    context: u64,
    key: String,
    event_name: String,
    callback: ChangeCallback,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new execution context listening on `key` / `event_name`
    pub fn context(&self, key: impl Into<String>, event_name: impl Into<String>) -> LocalNotifier {
        let context = {
            let mut inner = self.inner.borrow_mut();
            inner.next_context += 1;
            inner.next_context
        };
        LocalNotifier {
            hub: self.inner.clone(),
            context,
            key: key.into(),
            event_name: event_name.into(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// One context's view of a [`BroadcastHub`]. Clones stay in the same context.
#[derive(Clone)]
pub struct LocalNotifier {
    hub: Rc<RefCell<HubInner>>,
    context: u64,
    key: String,
    event_name: String,
}

impl ChangeNotifier for LocalNotifier {
    fn notify(&self) {
        // Collect first: callbacks may subscribe, notify or drop subscriptions
        let deliveries: Vec<(ChangeCallback, ChangeSource)> = self
            .hub
            .borrow()
            .listeners
            .iter()
            .filter_map(|listener| {
                if listener.context == self.context {
                    (listener.event_name == self.event_name)
                        .then(|| (listener.callback.clone(), ChangeSource::SameContext))
                } else {
                    (listener.key == self.key)
                        .then(|| (listener.callback.clone(), ChangeSource::OtherContext))
                }
            })
            .collect();

        for (callback, source) in deliveries {
            callback(source);
        }
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let id = {
            let mut inner = self.hub.borrow_mut();
            inner.next_listener += 1;
            let id = inner.next_listener;
            inner.listeners.push(HubListener {
                id,
                context: self.context,
                key: self.key.clone(),
                event_name: self.event_name.clone(),
                callback,
            });
            id
        };

        let hub = Rc::downgrade(&self.hub);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.borrow_mut().listeners.retain(|listener| listener.id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<ChangeSource>>>, ChangeCallback) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let callback: ChangeCallback =
            Rc::new(move |source: ChangeSource| sink.borrow_mut().push(source));
        (seen, callback)
    }

    #[test]
    fn test_channels_reach_the_right_contexts() {
        let hub = BroadcastHub::new();
        let tab_a = hub.context("fav", "fav:update");
        let tab_b = hub.context("fav", "fav:update");

        let (seen_a, callback_a) = recorder();
        let (seen_b, callback_b) = recorder();
        let _sub_a = tab_a.subscribe(callback_a);
        let _sub_b = tab_b.subscribe(callback_b);

        tab_a.notify();

        assert_eq!(*seen_a.borrow(), vec![ChangeSource::SameContext]);
        assert_eq!(*seen_b.borrow(), vec![ChangeSource::OtherContext]);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let hub = BroadcastHub::new();
        let favorites = hub.context("fav", "fav:update");
        let unrelated = hub.context("settings", "settings:update");

        let (seen, callback) = recorder();
        let _sub = unrelated.subscribe(callback);

        favorites.notify();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let hub = BroadcastHub::new();
        let tab = hub.context("fav", "fav:update");
        let (seen, callback) = recorder();

        let sub = tab.subscribe(callback);
        assert_eq!(hub.listener_count(), 1);
        drop(sub);
        assert_eq!(hub.listener_count(), 0);

        tab.notify();
        assert!(seen.borrow().is_empty());
    }
}
