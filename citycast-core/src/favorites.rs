//! Persisted favorites list and the pure list operations applied to it.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{model::FavoriteCity, storage::KeyValueStore};

pub const FAVORITES_KEY: &str = "favorites";

/// Reads and writes the whole favorites list under [`FAVORITES_KEY`].
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    kv: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored list, or empty if nothing was saved yet.
    pub async fn load(&self) -> Result<Vec<FavoriteCity>> {
        let Some(raw) = self.kv.get(FAVORITES_KEY).await.context("Failed to read favorites")? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).context("Stored favorites are not valid JSON")
    }

    pub async fn save(&self, favorites: &[FavoriteCity]) -> Result<()> {
        let json = serde_json::to_string(favorites).context("Failed to serialize favorites")?;
        self.kv.set(FAVORITES_KEY, &json).await.context("Failed to write favorites")
    }
}

/// Replace the entry with the same id in place, or prepend a new one.
pub fn upsert(favorites: &[FavoriteCity], item: FavoriteCity) -> Vec<FavoriteCity> {
    if favorites.iter().any(|f| f.id == item.id) {
        favorites
            .iter()
            .map(|f| if f.id == item.id { item.clone() } else { f.clone() })
            .collect()
    } else {
        std::iter::once(item).chain(favorites.iter().cloned()).collect()
    }
}

pub fn remove(favorites: &[FavoriteCity], id: &str) -> Vec<FavoriteCity> {
    favorites.iter().filter(|f| f.id != id).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn fav(id: &str, temp: Option<i32>) -> FavoriteCity {
        FavoriteCity {
            id: id.to_string(),
            name: format!("City {id}"),
            lat: 0.0,
            lon: 0.0,
            temp,
        }
    }

    #[test]
    fn upsert_prepends_new_entries() {
        let list = upsert(&[fav("a", None)], fav("b", Some(3)));
        let ids: Vec<_> = list.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn upsert_replaces_existing_without_growing() {
        let list = vec![fav("a", Some(1)), fav("b", Some(2))];
        let updated = upsert(&list, fav("b", Some(20)));

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1].temp, Some(20));
        assert_eq!(updated[0], list[0]);
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let list = vec![fav("a", None)];
        assert_eq!(remove(&list, "zzz"), list);
        assert!(remove(&list, "a").is_empty());
    }

    #[tokio::test]
    async fn store_roundtrip_and_empty_default() {
        let store = FavoritesStore::new(Arc::new(MemoryStore::new()));
        assert!(store.load().await.unwrap().is_empty());

        let list = vec![fav("a", Some(1)), fav("b", None)];
        store.save(&list).await.unwrap();
        assert_eq!(store.load().await.unwrap(), list);
    }

    #[tokio::test]
    async fn corrupt_payload_is_an_error() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(FAVORITES_KEY, "{not json").await.unwrap();

        let err = FavoritesStore::new(kv).load().await.unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
