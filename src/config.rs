//! Favorites configuration
//!
//! Where the remote store lives and which storage key / event name the
//! contexts of one profile agree on.

use serde::{Deserialize, Serialize};

use crate::domain::{FavoritesError, FavoritesResult};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";
pub const DEFAULT_STORAGE_KEY: &str = "fav:restaurants:v1";
pub const DEFAULT_EVENT_NAME: &str = "fav:update";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesConfig {
    /// Base address of the remote store, without the `/users/places` path
    pub api_base: String,
    /// localStorage key holding the cached collection
    pub storage_key: String,
    /// Name of the same-context change event
    pub event_name: String,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            api_base: option_env!("FAVORITES_API_BASE_URL")
                .unwrap_or(DEFAULT_API_BASE)
                .to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }
}

impl FavoritesConfig {
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(raw: &str) -> FavoritesResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| FavoritesError::InvalidArgument(format!("favorites config: {}", e)))
    }

    /// `api_base` without trailing slashes, checked to be an http(s) URL
    pub fn normalized_api_base(&self) -> FavoritesResult<String> {
        let base = self.api_base.trim().trim_end_matches('/');
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(FavoritesError::InvalidArgument(format!(
                "api base must start with http:// or https://, got {:?}",
                self.api_base
            )));
        }
        Ok(base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            FavoritesConfig::from_json(r#"{ "api_base": "https://api.example.com/" }"#).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.event_name, DEFAULT_EVENT_NAME);
        assert_eq!(config.normalized_api_base().unwrap(), "https://api.example.com");
    }

    #[test]
    fn test_rejects_non_http_base() {
        let config = FavoritesConfig::default().with_api_base("ftp://example.com");
        assert!(matches!(
            config.normalized_api_base(),
            Err(FavoritesError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(FavoritesConfig::from_json("[1, 2]").is_err());
    }
}
