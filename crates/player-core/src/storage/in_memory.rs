use crate::storage::{KeyValueStorage, StorageError};
use async_lock::Mutex;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryStorage {
    storage: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.storage.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .lock()
            .await
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.lock().await.remove(key);

        Ok(())
    }
}
