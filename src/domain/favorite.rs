//! Favorite Entity
//!
//! A single favorited listing as stored locally and on the server.
//!
//! Payloads reach us untyped (server JSON, old localStorage snapshots), so
//! every record passes through [`FavoriteRecord::from_value`]: ids become
//! strings whatever their wire type, missing names and ratings get their
//! defaults, and coordinates are kept only when numeric.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Canonical string identifier of a favorite
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FavoriteId(String);

impl FavoriteId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical decimal form of a numeric-looking id, e.g. `"007"` -> `"7"`.
    ///
    /// The server may hold the same id as a number; this is the spelling it
    /// would answer to.
    pub fn numeric_alternate(&self) -> Option<FavoriteId> {
        numeric_alternate(&self.0).map(FavoriteId)
    }
}

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FavoriteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FavoriteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FavoriteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FavoriteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&FavoriteId> for FavoriteId {
    fn from(id: &FavoriteId) -> Self {
        id.clone()
    }
}

impl From<u32> for FavoriteId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for FavoriteId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for FavoriteId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for FavoriteId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<f64> for FavoriteId {
    fn from(id: f64) -> Self {
        Self(canonical_number(id))
    }
}

impl<'de> Deserialize<'de> for FavoriteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self(scalar_text(&value).unwrap_or_default()))
    }
}

/// A favorited listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct FavoriteRecord {
    pub id: FavoriteId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    pub rating: f64,
}

impl FavoriteRecord {
    /// Create a record with no descriptive fields and a zero rating
    pub fn new(id: impl Into<FavoriteId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            img: None,
            category: None,
            price: None,
            time: None,
            lat: None,
            lon: None,
            rating: 0.0,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_img(mut self, img: impl Into<String>) -> Self {
        self.img = Some(img.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Normalize an untyped JSON record.
    ///
    /// Returns `None` for non-objects and for records whose id is missing or
    /// empty after normalization.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let id = map.get("id").and_then(scalar_text).unwrap_or_default();
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: FavoriteId(id),
            name: map.get("name").and_then(scalar_text).unwrap_or_default(),
            img: text_field(map, "img"),
            category: text_field(map, "category"),
            price: text_field(map, "price"),
            time: text_field(map, "time"),
            lat: map.get("lat").and_then(Value::as_f64),
            lon: map.get("lon").and_then(Value::as_f64),
            rating: map.get("rating").and_then(Value::as_f64).unwrap_or(0.0),
        })
    }
}

impl TryFrom<Value> for FavoriteRecord {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
            .ok_or_else(|| "favorite record needs an object with a non-empty id".to_string())
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_text)
}

/// String form of a scalar JSON value; `None` for null, arrays and objects
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(if let Some(i) = n.as_i64() {
            i.to_string()
        } else if let Some(u) = n.as_u64() {
            u.to_string()
        } else {
            canonical_number(n.as_f64().unwrap_or_default())
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Canonical decimal spelling of a numeric-looking string.
///
/// Surrounding whitespace is ignored. Blank strings, non-finite values and
/// anything that is not plain decimal/exponent notation yield `None`.
pub(crate) fn numeric_alternate(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str also accepts "inf" and "NaN"
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(canonical_number)
}

fn canonical_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}
