use crate::storage::{KeyValueStorage, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::create_dir_all;
use tokio::io::AsyncWriteExt;

/// One file per key under a root directory.
pub struct OnDiskStorage {
    path: PathBuf,
}

impl OnDiskStorage {
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.path.join(key)
    }
}

#[async_trait]
impl KeyValueStorage for OnDiskStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.key_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if matches!(error.kind(), ErrorKind::NotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        create_dir_all(&self.path).await?;

        // Readers never observe a half-written value.
        let temp_path = self.path.join(format!(".{}.tmp", key));

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .await?;

        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;

        tokio::fs::rename(&temp_path, self.key_path(key)).await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(error) if matches!(error.kind(), ErrorKind::NotFound) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
