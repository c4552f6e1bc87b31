// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Locally persisted favorite menu items.
//!
//! Favorites never leave the device. They live under their own key, so neither
//! a delivery logout nor a session restore touches them.

use super::{get_json, keys, set_json, KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Favorites errors
#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Item has no numeric id: {0}")]
    InvalidItem(String),

    #[error("Favorites import must be a JSON array of items: {0}")]
    Format(String),
}

/// One saved item: the menu item as the server sent it, plus when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: u64,
    #[serde(
        rename = "addedToFavoritesAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub added_at: Option<DateTime<Utc>>,
    /// Remaining item fields, kept verbatim
    #[serde(flatten)]
    pub item: Map<String, Value>,
}

impl Favorite {
    fn from_item(item: &Value) -> Result<Self, FavoritesError> {
        let Value::Object(fields) = item else {
            return Err(FavoritesError::InvalidItem(item.to_string()));
        };
        let id = fields
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| FavoritesError::InvalidItem(item.to_string()))?;

        let mut item = fields.clone();
        item.remove("id");
        item.remove("addedToFavoritesAt");

        Ok(Self {
            id,
            added_at: Some(Utc::now()),
            item,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.item.get("name").and_then(Value::as_str)
    }
}

/// Favorites list kept in the shared key-value store.
#[derive(Clone)]
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved favorites in insertion order; a missing or unreadable list is empty.
    pub async fn load(&self) -> Result<Vec<Favorite>, FavoritesError> {
        let favorites: Option<Vec<Favorite>> = get_json(&*self.store, keys::FAVORITES).await?;
        Ok(favorites.unwrap_or_default())
    }

    async fn save(&self, favorites: &[Favorite]) -> Result<(), FavoritesError> {
        set_json(&*self.store, keys::FAVORITES, favorites).await?;
        Ok(())
    }

    /// Save `item`, stamping when it was added. An id already saved is left as is.
    pub async fn add(&self, item: &Value) -> Result<Vec<Favorite>, FavoritesError> {
        let favorite = Favorite::from_item(item)?;
        let mut favorites = self.load().await?;

        if favorites.iter().any(|f| f.id == favorite.id) {
            tracing::debug!(id = favorite.id, "Item already in favorites");
            return Ok(favorites);
        }

        tracing::info!(
            id = favorite.id,
            name = favorite.name().unwrap_or_default(),
            total = favorites.len() + 1,
            "Added favorite"
        );
        favorites.push(favorite);
        self.save(&favorites).await?;
        Ok(favorites)
    }

    pub async fn remove(&self, id: u64) -> Result<Vec<Favorite>, FavoritesError> {
        let mut favorites = self.load().await?;
        favorites.retain(|f| f.id != id);
        self.save(&favorites).await?;

        tracing::info!(id, total = favorites.len(), "Removed favorite");
        Ok(favorites)
    }

    pub async fn contains(&self, id: u64) -> Result<bool, FavoritesError> {
        Ok(self.get(id).await?.is_some())
    }

    pub async fn get(&self, id: u64) -> Result<Option<Favorite>, FavoritesError> {
        Ok(self.load().await?.into_iter().find(|f| f.id == id))
    }

    /// Remove `item` if saved, otherwise add it.
    pub async fn toggle(&self, item: &Value) -> Result<Vec<Favorite>, FavoritesError> {
        let id = Favorite::from_item(item)?.id;
        if self.contains(id).await? {
            self.remove(id).await
        } else {
            self.add(item).await
        }
    }

    pub async fn clear(&self) -> Result<(), FavoritesError> {
        self.store.remove(keys::FAVORITES).await?;
        tracing::info!("Cleared favorites");
        Ok(())
    }

    pub async fn count(&self) -> Result<usize, FavoritesError> {
        Ok(self.load().await?.len())
    }

    /// Pretty-printed JSON backup of the list.
    pub async fn export(&self) -> Result<String, FavoritesError> {
        let favorites = self.load().await?;
        serde_json::to_string_pretty(&favorites).map_err(|e| StoreError::from(e).into())
    }

    /// Replace the list with a backup produced by [`export`](Self::export).
    ///
    /// Anything but an array of items with numeric ids is refused and the
    /// saved list is left untouched. Repeated ids keep their first entry.
    pub async fn import(&self, raw: &str) -> Result<Vec<Favorite>, FavoritesError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| FavoritesError::Format(e.to_string()))?;
        if !value.is_array() {
            return Err(FavoritesError::Format("not an array".to_string()));
        }
        let imported: Vec<Favorite> =
            serde_json::from_value(value).map_err(|e| FavoritesError::Format(e.to_string()))?;

        let mut favorites: Vec<Favorite> = Vec::with_capacity(imported.len());
        for favorite in imported {
            if !favorites.iter().any(|f| f.id == favorite.id) {
                favorites.push(favorite);
            }
        }

        self.save(&favorites).await?;
        tracing::info!(total = favorites.len(), "Imported favorites");
        Ok(favorites)
    }
}
