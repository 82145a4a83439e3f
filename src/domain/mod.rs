//! Domain Layer
//!
//! Favorite records, the ordered collection, and the error taxonomy.
//! This layer knows nothing about storage, events or HTTP.

mod collection;
mod error;
mod favorite;

pub use collection::FavoritesCollection;
pub use error::{FavoritesError, FavoritesResult};
pub use favorite::{FavoriteId, FavoriteRecord};

pub(crate) use favorite::{numeric_alternate, scalar_text};
