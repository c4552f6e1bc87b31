// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent key-value storage port.
//!
//! Both the gateway and the session manager share one store. It is treated as
//! last-writer-wins with no transactions.

pub mod favorites;
pub mod file;
pub mod memory;

pub use favorites::{Favorite, FavoritesError, FavoritesStore};
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Persisted key names as constants.
pub mod keys {
    /// Stable device id
    pub const DEVICE_ID: &str = "device_id";
    /// Device id key used by older installs; migrated to `DEVICE_ID`
    pub const LEGACY_DEVICE_ID: &str = "app_device_id";
    /// Serialized device record
    pub const DEVICE_RECORD: &str = "device_record";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Serialized delivery profile
    pub const DELIVERY_PROFILE: &str = "user";
    /// Most recent client session backup
    pub const SESSION_BACKUP: &str = "client_session_backup";
    /// Saved favorite menu items
    pub const FAVORITES: &str = "app_favorites";

    /// Everything that belongs to a delivery login.
    pub const DELIVERY_CREDENTIALS: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, DELIVERY_PROFILE];
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// Read and deserialize a JSON value.
///
/// A value that no longer parses is reported as absent so callers can rebuild it.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable stored value");
            Ok(None)
        }
    }
}

/// Serialize and write a JSON value.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
