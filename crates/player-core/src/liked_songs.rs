use crate::storage::{load_list, save_list, KeyValueStorage, StorageError, LIKED_SONGS_KEY};
use crate::{Track, TrackId};
use async_lock::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Persisted set of liked tracks; the whole list is rewritten on every change.
pub struct LikedSongs {
    storage: Arc<dyn KeyValueStorage>,
    write_lock: Mutex<()>,
}

impl LikedSongs {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<Vec<Track>, StorageError> {
        load_list(self.storage.as_ref(), LIKED_SONGS_KEY).await
    }

    pub async fn is_liked(&self, track_id: &TrackId) -> Result<bool, StorageError> {
        Ok(self.list().await?.iter().any(|t| t.id() == track_id))
    }

    /// Returns whether the track is liked after the toggle.
    pub async fn toggle(&self, track: &Track) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut liked: Vec<Track> = self.list().await?;
        let before = liked.len();
        liked.retain(|t| t.id() != track.id());

        let is_liked = liked.len() == before;
        if is_liked {
            liked.push(track.clone());
        }

        save_list(self.storage.as_ref(), LIKED_SONGS_KEY, &liked).await?;

        debug!(track_id = %track.id(), is_liked, "Liked songs updated");

        Ok(is_liked)
    }
}
