//! Repository Layer
//!
//! Persistence of the last-known favorites collection.

mod browser;
mod local_store;
mod memory;
mod traits;

pub use browser::BrowserStorage;
pub use local_store::LocalStore;
pub use memory::MemoryStorage;
pub use traits::{StorageBackend, StorageError};
