//! `window.localStorage` storage backend

use wasm_bindgen::{JsCast, JsValue};

use super::traits::{StorageBackend, StorageError};

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        // Throws when storage is disabled (privacy settings, sandboxed iframes)
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or(StorageError::Unavailable)
    }
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(js_error)
    }
}

fn js_error(err: JsValue) -> StorageError {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(exception) if exception.name() == "QuotaExceededError" => StorageError::QuotaExceeded,
        Some(exception) => {
            StorageError::Backend(format!("{}: {}", exception.name(), exception.message()))
        }
        None => StorageError::Backend(format!("{:?}", err)),
    }
}
