//! Remote Reconciliation
//!
//! Request/response contract of the authoritative favorites store.

use async_trait::async_trait;

use crate::domain::{FavoriteRecord, FavoritesResult};

mod client;

pub use client::HttpFavoritesClient;

/// The four operations the coordinator needs from the server.
///
/// Futures are not `Send`: the engine runs on a single-threaded executor
/// (the browser's, or a current-thread runtime).
#[async_trait(?Send)]
pub trait FavoritesRemote {
    /// Current server-side favorites, normalized, in server order
    async fn list(&self) -> FavoritesResult<Vec<FavoriteRecord>>;

    /// Create or replace one favorite
    async fn upsert(&self, record: &FavoriteRecord) -> FavoritesResult<()>;

    /// Delete one favorite; empty ids are a no-op
    async fn delete_by_id(&self, id: &str) -> FavoritesResult<()>;

    /// Delete every favorite the server currently lists
    async fn delete_all(&self) -> FavoritesResult<()>;
}
