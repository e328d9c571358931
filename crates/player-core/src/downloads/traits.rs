use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    pub status: u16,
    pub bytes_written: u64,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Receives the written fraction in `[0, 1]`.
pub type Progress<'a> = &'a (dyn Fn(f64) + Send + Sync);

#[async_trait]
pub trait TrackFetcher: Send + Sync {
    /// Writes the body of `url` into `destination`.
    ///
    /// A non-success status is returned as an outcome, not an error, and
    /// nothing is written in that case.
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        progress: Option<Progress<'_>>,
    ) -> Result<FetchOutcome, FetchError>;
}
