//! Domain Layer - Errors
//!
//! Everything a remote-backed favorites operation can fail with.
//! Storage failures are not part of this taxonomy: local persistence is a
//! best-effort cache and its errors never leave the repository layer.

use thiserror::Error;

use super::FavoriteId;

/// Common result type for favorites operations
pub type FavoritesResult<T> = Result<T, FavoritesError>;

#[derive(Error, Debug)]
pub enum FavoritesError {
    /// Malformed caller input, e.g. an upsert without an id
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote store answered with a non-success status
    #[error("{method} {endpoint} failed with status {status}")]
    Remote {
        method: &'static str,
        endpoint: String,
        status: u16,
    },

    /// Some deletes of a batch still failed after their retry
    #[error("Partial delete failure ({failed}/{total})")]
    AggregateRemote { failed: usize, total: usize },

    /// No response at all (connection refused, DNS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Another add/remove for the same id has not resolved yet
    #[error("A mutation for favorite {id} is already in flight")]
    Busy { id: FavoriteId },
}

impl FavoritesError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FavoritesError::Remote { status, .. } => Some(*status),
            FavoritesError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for failures that came from talking to the remote store
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FavoritesError::Remote { .. }
                | FavoritesError::AggregateRemote { .. }
                | FavoritesError::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FavoritesError::Remote {
            method: "DELETE",
            endpoint: "/users/places/7".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "DELETE /users/places/7 failed with status 404");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_remote());

        let err = FavoritesError::AggregateRemote { failed: 1, total: 2 };
        assert_eq!(err.to_string(), "Partial delete failure (1/2)");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_local_errors_are_not_remote() {
        assert!(!FavoritesError::InvalidArgument("x".into()).is_remote());
        assert!(!FavoritesError::Busy { id: FavoriteId::from("7") }.is_remote());
    }
}
