use crate::downloads::traits::{FetchError, Progress, TrackFetcher};
use crate::storage::{load_list, save_list, KeyValueStorage, StorageError, DOWNLOADED_SONGS_KEY};
use crate::{GatewayEndpoint, StreamMode, Track, TrackId};
use async_lock::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Downloaded(Track),
    /// The manifest already had the id; nothing was fetched.
    AlreadyDownloaded(Track),
}

impl DownloadOutcome {
    pub fn track(&self) -> &Track {
        match self {
            DownloadOutcome::Downloaded(track) | DownloadOutcome::AlreadyDownloaded(track) => track,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Download failed with status {0}")]
    DownloadFailed(u16),
    #[error("Track id {0} cannot be used as a file name")]
    InvalidTrackId(TrackId),
    #[error(transparent)]
    Transfer(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Keeps audio files in `directory` and their manifest in storage.
pub struct DownloadManager {
    storage: Arc<dyn KeyValueStorage>,
    fetcher: Arc<dyn TrackFetcher>,
    endpoint: GatewayEndpoint,
    directory: PathBuf,
    manifest_lock: Mutex<()>,
    in_flight: Mutex<HashMap<TrackId, Arc<Mutex<()>>>>,
}

impl DownloadManager {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        fetcher: Arc<dyn TrackFetcher>,
        endpoint: GatewayEndpoint,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            endpoint,
            directory: directory.into(),
            manifest_lock: Mutex::new(()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn list(&self) -> Result<Vec<Track>, DownloadError> {
        Ok(load_list(self.storage.as_ref(), DOWNLOADED_SONGS_KEY).await?)
    }

    /// Downloads of the same id are serialized; the later caller gets
    /// [`DownloadOutcome::AlreadyDownloaded`] once the first one lands.
    pub async fn download(
        &self,
        track: &Track,
        progress: Option<Progress<'_>>,
    ) -> Result<DownloadOutcome, DownloadError> {
        let file_path = self.file_path(track.id())?;
        let slot = self.acquire_slot(track.id()).await;

        let guard = slot.lock_arc().await;
        let result = self.download_exclusive(track, &file_path, progress).await;
        drop(guard);

        self.release_slot(track.id(), slot).await;

        result
    }

    pub async fn delete(&self, track_id: &TrackId) -> Result<(), DownloadError> {
        let file_path = self.file_path(track_id)?;

        {
            let _guard = self.manifest_lock.lock().await;

            let mut manifest: Vec<Track> =
                load_list(self.storage.as_ref(), DOWNLOADED_SONGS_KEY).await?;
            let before = manifest.len();
            manifest.retain(|track| track.id() != track_id);

            if manifest.len() != before {
                save_list(self.storage.as_ref(), DOWNLOADED_SONGS_KEY, &manifest).await?;
                info!(%track_id, "Download removed from manifest");
            }
        }

        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => debug!(%track_id, "Downloaded file removed"),
            Err(error) if error.kind() == ErrorKind::NotFound => (),
            Err(error) => warn!(%track_id, ?error, "Unable to remove downloaded file"),
        }

        Ok(())
    }

    async fn download_exclusive(
        &self,
        track: &Track,
        file_path: &Path,
        progress: Option<Progress<'_>>,
    ) -> Result<DownloadOutcome, DownloadError> {
        if let Some(existing) = self.find(track.id()).await? {
            debug!(track_id = %track.id(), "Track is already downloaded");
            return Ok(DownloadOutcome::AlreadyDownloaded(existing));
        }

        tokio::fs::create_dir_all(&self.directory).await?;

        let url = self
            .endpoint
            .stream_url(track.source_url(), StreamMode::Attachment);
        let part_path = file_path.with_extension("mp3.part");

        info!(track_id = %track.id(), %url, "Downloading track");

        let outcome = match self.fetcher.fetch(&url, &part_path, progress).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(track_id = %track.id(), ?error, "Download transfer failed");
                remove_partial(&part_path).await;
                return Err(error.into());
            }
        };

        if !outcome.is_success() {
            warn!(track_id = %track.id(), status = outcome.status, "Download rejected");
            remove_partial(&part_path).await;
            return Err(DownloadError::DownloadFailed(outcome.status));
        }

        tokio::fs::rename(&part_path, file_path).await?;

        let file_path = tokio::fs::canonicalize(file_path).await?;
        let downloaded = track.with_local_uri(format!("file://{}", file_path.display()));

        {
            let _guard = self.manifest_lock.lock().await;

            let mut manifest: Vec<Track> =
                load_list(self.storage.as_ref(), DOWNLOADED_SONGS_KEY).await?;

            if !manifest.iter().any(|entry| entry.id() == track.id()) {
                manifest.push(downloaded.clone());
                save_list(self.storage.as_ref(), DOWNLOADED_SONGS_KEY, &manifest).await?;
            }
        }

        info!(
            track_id = %track.id(),
            bytes = outcome.bytes_written,
            "Track downloaded"
        );

        Ok(DownloadOutcome::Downloaded(downloaded))
    }

    async fn find(&self, track_id: &TrackId) -> Result<Option<Track>, DownloadError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|track| track.id() == track_id))
    }

    /// Only ids made of `[A-Za-z0-9_-]` map to a file inside `directory`.
    fn file_path(&self, track_id: &TrackId) -> Result<PathBuf, DownloadError> {
        let is_safe = !track_id.is_empty()
            && track_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !is_safe {
            warn!(%track_id, "Refusing to map track id to a file");
            return Err(DownloadError::InvalidTrackId(track_id.clone()));
        }

        Ok(self.directory.join(format!("{}.mp3", track_id)))
    }

    async fn acquire_slot(&self, track_id: &TrackId) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;

        Arc::clone(
            in_flight
                .entry(track_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    async fn release_slot(&self, track_id: &TrackId, slot: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;

        // Map entry plus ours: no one else is waiting on this id.
        if Arc::strong_count(&slot) == 2 {
            in_flight.remove(track_id);
        }
    }
}

async fn remove_partial(path: &Path) {
    if let Err(error) = tokio::fs::remove_file(path).await {
        if error.kind() != ErrorKind::NotFound {
            warn!(?error, path = %path.display(), "Unable to remove partial download");
        }
    }
}
