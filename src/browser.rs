//! Browser assembly: localStorage, window events and the HTTP client wired
//! into one coordinator.

use std::rc::Rc;

use log::warn;

use crate::config::FavoritesConfig;
use crate::coordinator::Favorites;
use crate::domain::FavoritesResult;
use crate::notify::BrowserNotifier;
use crate::remote::HttpFavoritesClient;
use crate::repository::{BrowserStorage, LocalStore};

/// Build the coordinator for this page and start its one-time server fetch.
///
/// The cached view is usable immediately; the server's list replaces it
/// when the fetch resolves.
pub fn install(config: FavoritesConfig) -> FavoritesResult<Favorites> {
    console_error_panic_hook::set_once();
    init_logging();

    let remote = HttpFavoritesClient::from_config(&config)?;
    let store = LocalStore::new(Rc::new(BrowserStorage), config.storage_key.clone());
    let notifier = BrowserNotifier::new(config.storage_key, config.event_name);
    let favorites = Favorites::new(store, Rc::new(notifier), Rc::new(remote));

    let initializing = favorites.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = initializing.initialize().await {
            warn!("Initial favorites fetch failed: {}", e);
        }
    });

    Ok(favorites)
}

#[cfg(target_arch = "wasm32")]
fn init_logging() {
    static LOGGER: std::sync::Once = std::sync::Once::new();
    LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::default()));
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {}
