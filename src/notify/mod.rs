//! Cross-Context Notifier
//!
//! "The favorites changed" signal. It reaches two audiences:
//! other contexts sharing the storage (the storage-change channel, keyed by
//! the storage key) and consumers inside the emitting context (a locally
//! dispatched event). The signal carries no payload; receivers re-read the
//! local store.

use std::rc::Rc;

mod browser;
mod hub;

pub use browser::BrowserNotifier;
pub use hub::{BroadcastHub, LocalNotifier};

/// Channel a change signal arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// Storage-change notification from another context
    OtherContext,
    /// Event dispatched in this context
    SameContext,
}

pub type ChangeCallback = Rc<dyn Fn(ChangeSource)>;

pub trait ChangeNotifier {
    /// Emit the change signal on both channels
    fn notify(&self);

    /// Listen on both channels until the returned guard is dropped
    fn subscribe(&self, callback: ChangeCallback) -> Subscription;
}

/// Unregisters its listeners when dropped
#[must_use = "dropping a Subscription unregisters its listeners"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to undo
    pub fn noop() -> Self {
        Self { cancel: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
