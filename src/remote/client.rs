use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::FavoritesRemote;
use crate::config::FavoritesConfig;
use crate::domain::{
    numeric_alternate, scalar_text, FavoriteRecord, FavoritesError, FavoritesResult,
};

const PLACES_PATH: &str = "/users/places";

/// Characters `encodeURIComponent` leaves alone
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// HTTP client for the `/users/places` favorites endpoints
#[derive(Debug, Clone)]
pub struct HttpFavoritesClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    place: &'a FavoriteRecord,
}

impl HttpFavoritesClient {
    /// Create a client for `base_url` (scheme required, trailing slash optional)
    pub fn new(base_url: impl Into<String>) -> FavoritesResult<Self> {
        let config = FavoritesConfig::default().with_api_base(base_url);
        Self::from_config(&config)
    }

    pub fn from_config(config: &FavoritesConfig) -> FavoritesResult<Self> {
        let base_url = config.normalized_api_base()?;
        let client = Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn places_url(&self) -> String {
        format!("{}{}", self.base_url, PLACES_PATH)
    }

    fn place_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, PLACES_PATH, utf8_percent_encode(id, PATH_SEGMENT))
    }

    /// Raw `places` array of the list endpoint
    async fn fetch_places(&self) -> FavoritesResult<Vec<Value>> {
        let response = self
            .client
            .get(self.places_url())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_error("GET", PLACES_PATH.to_string(), status));
        }

        let body: Value = response.json().await?;
        Ok(places_of(body))
    }

    /// Delete by the id's string form, then once more by its numeric form.
    ///
    /// Only a refused request is retried; a transport failure is returned as is.
    async fn delete_with_fallback(&self, raw_id: Option<String>) -> FavoritesResult<()> {
        let Some(id) = raw_id else {
            return Ok(());
        };

        match self.delete_by_id(&id).await {
            Ok(()) => Ok(()),
            Err(first @ FavoritesError::Remote { .. }) => match numeric_alternate(&id) {
                Some(alternate) => {
                    debug!("Delete of {:?} failed ({}), retrying as {:?}", id, first, alternate);
                    self.delete_by_id(&alternate).await
                }
                None => Err(first),
            },
            Err(e) => Err(e),
        }
    }
}

#[async_trait(?Send)]
impl FavoritesRemote for HttpFavoritesClient {
    async fn list(&self) -> FavoritesResult<Vec<FavoriteRecord>> {
        let places = self.fetch_places().await?;
        let records: Vec<FavoriteRecord> =
            places.iter().filter_map(FavoriteRecord::from_value).collect();
        debug!("Listed {} favorites ({} raw)", records.len(), places.len());
        Ok(records)
    }

    async fn upsert(&self, record: &FavoriteRecord) -> FavoritesResult<()> {
        if record.id.is_empty() {
            return Err(FavoritesError::InvalidArgument("place.id is required".to_string()));
        }

        let response = self
            .client
            .post(self.places_url())
            .json(&UpsertBody { place: record })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_error("POST", PLACES_PATH.to_string(), status));
        }
        debug!("Upserted favorite {}", record.id);
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> FavoritesResult<()> {
        if id.is_empty() {
            return Ok(());
        }

        let response = self.client.delete(self.place_url(id)).send().await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::NO_CONTENT {
            return Err(remote_error("DELETE", format!("{}/{}", PLACES_PATH, id), status));
        }
        debug!("Deleted favorite {}", id);
        Ok(())
    }

    async fn delete_all(&self) -> FavoritesResult<()> {
        let places = match self.fetch_places().await {
            Ok(places) => places,
            Err(e) => {
                debug!("Could not list favorites before delete-all, nothing to delete: {}", e);
                return Ok(());
            }
        };

        let total = places.len();
        let outcomes = join_all(
            places
                .iter()
                .map(|place| self.delete_with_fallback(place.get("id").and_then(scalar_text))),
        )
        .await;

        let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
        if failed > 0 {
            warn!("Delete-all left {}/{} favorites on the server", failed, total);
            return Err(FavoritesError::AggregateRemote { failed, total });
        }
        debug!("Deleted all {} favorites", total);
        Ok(())
    }
}

fn remote_error(method: &'static str, endpoint: String, status: StatusCode) -> FavoritesError {
    FavoritesError::Remote {
        method,
        endpoint,
        status: status.as_u16(),
    }
}

/// `body.places` when it is an array, otherwise nothing
fn places_of(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("places") {
            Some(Value::Array(places)) => places,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
