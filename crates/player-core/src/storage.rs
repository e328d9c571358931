mod in_memory;
mod on_disk;

pub use in_memory::InMemoryStorage;
pub use on_disk::OnDiskStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

pub const LIKED_SONGS_KEY: &str = "LIKED_SONGS";
pub const DOWNLOADED_SONGS_KEY: &str = "DOWNLOADED_SONGS";
pub const RECENT_SEARCHES_KEY: &str = "RECENT_SEARCHES";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Opaque key to JSON blob persistence.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// A missing or unreadable blob is treated as an empty list.
pub(crate) async fn load_list<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    let raw = match storage.get(key).await? {
        Some(raw) => raw,
        None => return Ok(vec![]),
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(error) => {
            warn!(?error, key, "Stored list is corrupted, starting from empty");
            Ok(vec![])
        }
    }
}

pub(crate) async fn save_list<T: Serialize + Sync>(
    storage: &dyn KeyValueStorage,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)?;

    storage.set(key, &raw).await
}
