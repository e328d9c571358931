use crate::types::TrackItem;
use actix_web::web::Bytes;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct ProviderError(pub(crate) Box<dyn std::error::Error + Send + Sync>);

#[async_trait]
pub(crate) trait UpstreamProvider: Send + Sync {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ProviderError>;
    async fn search(&self, query: &str) -> Result<Vec<TrackItem>, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExtractError {
    #[error("Unable to start extraction: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Extractor exited unsuccessfully: {0}")]
    ExitStatus(String),
    #[error("Extractor produced no audio")]
    EmptyOutput,
    #[error("Timed out waiting for audio")]
    Timeout,
}

#[async_trait]
pub(crate) trait AudioExtractor: Send + Sync {
    async fn extract(&self, source_url: &str) -> Result<Box<dyn AudioSource>, ExtractError>;
}

/// Incremental audio output of a single extraction.
///
/// Dropping the source must release whatever produces the bytes.
#[async_trait]
pub(crate) trait AudioSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ExtractError>;
}
