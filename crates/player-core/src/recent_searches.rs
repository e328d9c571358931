use crate::storage::{load_list, save_list, KeyValueStorage, StorageError, RECENT_SEARCHES_KEY};
use async_lock::Mutex;
use std::sync::Arc;

const MAX_RECENT_SEARCHES: usize = 10;

/// Most-recent-first list of search terms.
pub struct RecentSearches {
    storage: Arc<dyn KeyValueStorage>,
    write_lock: Mutex<()>,
}

impl RecentSearches {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        load_list(self.storage.as_ref(), RECENT_SEARCHES_KEY).await
    }

    pub async fn add(&self, term: &str) -> Result<Vec<String>, StorageError> {
        let term = term.trim();

        let _guard = self.write_lock.lock().await;
        let mut terms = self.list().await?;

        if term.is_empty() {
            return Ok(terms);
        }

        terms.retain(|existing| existing != term);
        terms.insert(0, term.to_string());
        terms.truncate(MAX_RECENT_SEARCHES);

        save_list(self.storage.as_ref(), RECENT_SEARCHES_KEY, &terms).await?;

        Ok(terms)
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        self.storage.remove(RECENT_SEARCHES_KEY).await
    }
}
