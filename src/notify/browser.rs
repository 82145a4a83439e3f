//! DOM-backed notifier: the `storage` event for other tabs, a `CustomEvent`
//! on `window` for listeners in this tab.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use super::{ChangeCallback, ChangeNotifier, ChangeSource, Subscription};

const STORAGE_EVENT: &str = "storage";

#[derive(Debug, Clone)]
pub struct BrowserNotifier {
    key: String,
    event_name: String,
}

impl BrowserNotifier {
    pub fn new(key: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            event_name: event_name.into(),
        }
    }
}

impl ChangeNotifier for BrowserNotifier {
    fn notify(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        match web_sys::CustomEvent::new(&self.event_name) {
            Ok(event) => {
                if let Err(e) = window.dispatch_event(&event) {
                    log::warn!("Dispatching {} failed: {:?}", self.event_name, e);
                }
            }
            Err(e) => log::warn!("Creating {} event failed: {:?}", self.event_name, e),
        }
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let Some(window) = web_sys::window() else {
            return Subscription::noop();
        };

        let key = self.key.clone();
        let on_storage_callback = callback.clone();
        let on_storage = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            // The storage event fires in every other tab for every key
            let changed = event
                .dyn_ref::<web_sys::StorageEvent>()
                .and_then(|e| e.key());
            if changed.as_deref() == Some(key.as_str()) {
                on_storage_callback(ChangeSource::OtherContext);
            }
        });
        let on_local = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            callback(ChangeSource::SameContext);
        });

        let storage_fn: &js_sys::Function = on_storage.as_ref().unchecked_ref();
        let local_fn: &js_sys::Function = on_local.as_ref().unchecked_ref();
        if let Err(e) = window.add_event_listener_with_callback(STORAGE_EVENT, storage_fn) {
            log::warn!("Listening for storage events failed: {:?}", e);
        }
        if let Err(e) = window.add_event_listener_with_callback(&self.event_name, local_fn) {
            log::warn!("Listening for {} failed: {:?}", self.event_name, e);
        }

        let event_name = self.event_name.clone();
        Subscription::new(move || {
            let storage_fn: &js_sys::Function = on_storage.as_ref().unchecked_ref();
            let local_fn: &js_sys::Function = on_local.as_ref().unchecked_ref();
            let _ = window.remove_event_listener_with_callback(STORAGE_EVENT, storage_fn);
            let _ = window.remove_event_listener_with_callback(&event_name, local_fn);
        })
    }
}
