use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Unable to load {url}: {reason}")]
    LoadFailed { url: String, reason: String },
    #[error("Transport command failed: {0}")]
    CommandFailed(String),
}

/// Identifies one `replace` call; reloading the same track yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadId(pub(crate) u64);

impl std::fmt::Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single-track audio output device.
///
/// Natural end of a track is reported back through
/// [`SessionHandle::track_finished`](crate::SessionHandle::track_finished)
/// together with the [`LoadId`] the source was loaded under.
#[async_trait]
pub trait AudioTransport: Send {
    async fn replace(&mut self, url: &str, load_id: LoadId) -> Result<(), TransportError>;
    async fn play(&mut self) -> Result<(), TransportError>;
    async fn pause(&mut self) -> Result<(), TransportError>;
    async fn seek_to(&mut self, position: Duration) -> Result<(), TransportError>;
    fn is_playing(&self) -> bool;
}
