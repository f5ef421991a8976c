//! Persistence Adapter
//!
//! Best-effort key/value persistence for session state. Callers never see a
//! failure: `save` logs and moves on, `load` falls back to the supplied
//! default. State then simply lives in memory for the rest of the session.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const CART_KEY: &str = "cart";
pub const WISHLIST_KEY: &str = "wishlist";

/// Durable string store keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    async fn put(&self, key: &str, value: String) -> Result<(), PersistenceError>;
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self { Self { store: Arc::new(store) } }

    pub fn in_memory() -> Self { Self::new(MemoryStore::new()) }

    /// Serializes `value` under `key`. Failures are logged, never returned.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value).await {
            tracing::warn!(key, error = %e, "persistence unavailable, keeping state in memory");
        }
    }

    /// Reads `key`, returning `default` when it is missing, corrupt or unreadable.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_load(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not restore persisted state, using default");
                default
            }
        }
    }

    async fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(value)?;
        self.store.put(key, json).await
    }

    async fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("Persistence") }
}
