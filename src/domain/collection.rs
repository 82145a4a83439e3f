//! Favorites Collection
//!
//! Ordered list of favorites, most recently added first. Ids are unique:
//! inserting a record whose id is already present replaces the old entry
//! and moves it to the front.

use serde::{Deserialize, Serialize};

use super::{FavoriteId, FavoriteRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesCollection(Vec<FavoriteRecord>);

impl FavoritesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an externally ordered list (server snapshot, storage).
    ///
    /// Order is kept; for duplicate ids the first occurrence wins.
    pub fn from_records(records: impl IntoIterator<Item = FavoriteRecord>) -> Self {
        let mut items: Vec<FavoriteRecord> = Vec::new();
        for record in records {
            if !items.iter().any(|existing| existing.id == record.id) {
                items.push(record);
            }
        }
        Self(items)
    }

    /// Put `record` at the front, dropping any entry with the same id
    pub fn insert_front(&mut self, record: FavoriteRecord) {
        self.0.retain(|existing| existing.id != record.id);
        self.0.insert(0, record);
    }

    /// Remove the entry with `id`, returning it when present
    pub fn remove(&mut self, id: &str) -> Option<FavoriteRecord> {
        let index = self.0.iter().position(|record| record.id.as_str() == id)?;
        Some(self.0.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteRecord> {
        self.0.iter().find(|record| record.id.as_str() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &FavoriteId> {
        self.0.iter().map(|record| &record.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FavoriteRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[FavoriteRecord] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<FavoriteRecord> {
        self.0.clone()
    }
}

impl FromIterator<FavoriteRecord> for FavoritesCollection {
    fn from_iter<I: IntoIterator<Item = FavoriteRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

impl<'a> IntoIterator for &'a FavoritesCollection {
    type Item = &'a FavoriteRecord;
    type IntoIter = std::slice::Iter<'a, FavoriteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn record(id: &str, name: &str, rating: f64) -> FavoriteRecord {
        FavoriteRecord::new(id, name).with_rating(rating)
    }

    #[test]
    fn test_insert_front_replaces_same_id() {
        let mut items = FavoritesCollection::new();
        items.insert_front(record("7", "A", 4.2));
        assert_eq!(items.as_slice(), &[record("7", "A", 4.2)]);

        items.insert_front(record("7", "A2", 3.0));
        assert_eq!(items.as_slice(), &[record("7", "A2", 3.0)]);
    }

    #[test]
    fn test_insert_front_orders_most_recent_first() {
        let mut items = FavoritesCollection::new();
        items.insert_front(record("1", "one", 1.0));
        items.insert_front(record("2", "two", 2.0));
        items.insert_front(record("1", "one again", 1.5));

        let ids: Vec<&str> = items.ids().map(FavoriteId::as_str).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(items.get("1").map(|r| r.name.as_str()), Some("one again"));
    }

    #[test]
    fn test_ids_stay_unique_over_many_inserts() {
        let mut items = FavoritesCollection::new();
        for round in 0..5 {
            for id in ["a", "b", "c", "a", "b"] {
                items.insert_front(record(id, id, round as f64));
            }
        }
        assert_eq!(items.len(), 3);
        let mut ids: Vec<&str> = items.ids().map(FavoriteId::as_str).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut items = FavoritesCollection::from_records(vec![record("1", "one", 1.0)]);
        assert!(items.remove("9").is_none());
        assert_eq!(items.len(), 1);
        assert!(items.remove("1").is_some());
        assert!(items.is_empty());
    }

    #[test]
    fn test_from_records_keeps_first_duplicate() {
        let items = FavoritesCollection::from_records(vec![
            record("1", "first", 1.0),
            record("2", "two", 2.0),
            record("1", "second", 3.0),
        ]);
        assert_eq!(items.len(), 2);
        assert_eq!(items.get("1").map(|r| r.name.as_str()), Some("first"));
    }

    proptest! {
        #[test]
        fn test_ids_unique_under_any_edit_sequence(
            edits in prop::collection::vec((0u8..8, any::<bool>()), 0..64)
        ) {
            let mut items = FavoritesCollection::new();
            for (id, insert) in edits {
                let id = id.to_string();
                if insert {
                    items.insert_front(record(&id, "x", 0.0));
                    prop_assert_eq!(items.as_slice()[0].id.as_str(), id.as_str());
                } else {
                    items.remove(&id);
                    prop_assert!(!items.contains(&id));
                }

                let mut ids: Vec<&str> = items.ids().map(FavoriteId::as_str).collect();
                let len = ids.len();
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), len);
            }
        }

        #[test]
        fn test_from_records_keeps_first_occurrence(ids in prop::collection::vec(0u8..8, 0..32)) {
            let records = ids
                .iter()
                .enumerate()
                .map(|(i, id)| record(&id.to_string(), &i.to_string(), 0.0));
            let items = FavoritesCollection::from_records(records);

            let mut expected: Vec<(String, String)> = Vec::new();
            for (i, id) in ids.iter().enumerate() {
                if !expected.iter().any(|(seen, _)| *seen == id.to_string()) {
                    expected.push((id.to_string(), i.to_string()));
                }
            }
            let actual: Vec<(String, String)> =
                items.iter().map(|r| (r.id.to_string(), r.name.clone())).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
