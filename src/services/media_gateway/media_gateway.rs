use super::traits::{AudioExtractor, AudioSource, ExtractError, ProviderError, UpstreamProvider};
use crate::services::CacheStore;
use crate::types::{StreamMode, TrackItem};
use actix_web::web::Bytes;
use futures_lite::{stream, Stream};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub(crate) enum SearchError {
    #[error("Query is missing")]
    EmptyQuery,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum StreamError {
    #[error("Track URL is missing")]
    MissingSource,
    #[error("Unable to resolve audio: {0}")]
    ResolutionFailed(#[source] ExtractError),
    #[error("Audio stream aborted: {0}")]
    Aborted(#[source] ExtractError),
}

pub(crate) type AudioBody = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

pub(crate) struct AudioStream {
    pub(crate) mode: StreamMode,
    pub(crate) body: AudioBody,
}

#[derive(Clone, Debug)]
pub(crate) struct GatewayOptions {
    pub(crate) cache_capacity: usize,
    pub(crate) search_limit: usize,
    pub(crate) suggest_timeout: Duration,
    pub(crate) resolve_timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            search_limit: 15,
            suggest_timeout: Duration::from_secs(3),
            resolve_timeout: Duration::from_secs(30),
        }
    }
}

pub(crate) struct MediaGateway {
    provider: Arc<dyn UpstreamProvider>,
    extractor: Arc<dyn AudioExtractor>,
    suggestions_cache: CacheStore<String, Vec<String>>,
    search_cache: CacheStore<String, Vec<TrackItem>>,
    options: GatewayOptions,
}

fn cache_key(query: &str) -> Option<String> {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl MediaGateway {
    pub(crate) fn new(
        provider: Arc<dyn UpstreamProvider>,
        extractor: Arc<dyn AudioExtractor>,
        options: GatewayOptions,
    ) -> Self {
        Self {
            provider,
            extractor,
            suggestions_cache: CacheStore::new(options.cache_capacity),
            search_cache: CacheStore::new(options.cache_capacity),
            options,
        }
    }

    /// Never fails: any upstream problem degrades to an empty list.
    pub(crate) async fn suggest(&self, query: &str) -> Vec<String> {
        let key = match cache_key(query) {
            Some(key) => key,
            None => return vec![],
        };

        if let Some(suggestions) = self.suggestions_cache.get(&key).await {
            return suggestions;
        }

        let suggestions =
            match tokio::time::timeout(self.options.suggest_timeout, self.provider.suggest(query))
                .await
            {
                Ok(Ok(suggestions)) => suggestions,
                Ok(Err(error)) => {
                    warn!(?error, query, "Unable to fetch suggestions");
                    return vec![];
                }
                Err(_) => {
                    warn!(query, "Suggestions request timed out");
                    return vec![];
                }
            };

        self.suggestions_cache
            .put(key, suggestions.clone())
            .await;

        suggestions
    }

    pub(crate) async fn search(&self, query: &str) -> Result<Vec<TrackItem>, SearchError> {
        let key = cache_key(query).ok_or(SearchError::EmptyQuery)?;

        if let Some(tracks) = self.search_cache.get(&key).await {
            info!(query = %key, "Search cache hit");
            return Ok(tracks);
        }

        let mut tracks = match self.provider.search(&key).await {
            Ok(tracks) => tracks,
            Err(error) => {
                error!(?error, query = %key, "Search failed");
                return Err(error.into());
            }
        };
        tracks.truncate(self.options.search_limit);

        self.search_cache.put(key, tracks.clone()).await;

        Ok(tracks)
    }

    /// Starts extraction and waits for the first audio bytes, so resolution
    /// failures are reported before any response header is produced.
    pub(crate) async fn open_stream(
        &self,
        source_url: Option<&str>,
        mode: StreamMode,
    ) -> Result<AudioStream, StreamError> {
        let source_url = source_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(StreamError::MissingSource)?;

        let stream_id = Uuid::new_v4();

        info!(%stream_id, source_url, ?mode, "Resolving audio stream");

        let resolution = async {
            let mut source = self.extractor.extract(source_url).await?;
            let first_chunk = source.next_chunk().await?.ok_or(ExtractError::EmptyOutput)?;
            Ok::<_, ExtractError>((source, first_chunk))
        };

        let (source, first_chunk) =
            match tokio::time::timeout(self.options.resolve_timeout, resolution).await {
                Ok(Ok(resolved)) => resolved,
                Ok(Err(error)) => {
                    error!(%stream_id, ?error, "Audio resolution failed");
                    return Err(StreamError::ResolutionFailed(error));
                }
                Err(_) => {
                    error!(%stream_id, "Audio resolution timed out");
                    return Err(StreamError::ResolutionFailed(ExtractError::Timeout));
                }
            };

        let relay = Relay {
            stream_id,
            pending: Some(first_chunk),
            source: Some(source),
            bytes_sent: 0,
        };

        Ok(AudioStream {
            mode,
            body: Box::pin(stream::unfold(relay, Relay::advance)),
        })
    }
}

/// Forwards extractor output to the response body.
struct Relay {
    stream_id: Uuid,
    pending: Option<Bytes>,
    source: Option<Box<dyn AudioSource>>,
    bytes_sent: u64,
}

impl Relay {
    async fn advance(mut self) -> Option<(Result<Bytes, StreamError>, Self)> {
        if let Some(chunk) = self.pending.take() {
            self.bytes_sent += chunk.len() as u64;
            return Some((Ok(chunk), self));
        }

        let source = self.source.as_mut()?;

        match source.next_chunk().await {
            Ok(Some(chunk)) => {
                self.bytes_sent += chunk.len() as u64;
                Some((Ok(chunk), self))
            }
            Ok(None) => {
                self.source = None;
                info!(
                    stream_id = %self.stream_id,
                    bytes_sent = self.bytes_sent,
                    "Audio stream finished"
                );
                None
            }
            Err(error) => {
                // Headers are gone already; the only option left is to cut the connection.
                self.source = None;
                error!(
                    stream_id = %self.stream_id,
                    bytes_sent = self.bytes_sent,
                    ?error,
                    "Audio stream aborted after headers were sent"
                );
                Some((Err(StreamError::Aborted(error)), self))
            }
        }
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        if self.source.is_some() {
            debug!(
                stream_id = %self.stream_id,
                bytes_sent = self.bytes_sent,
                "Client disconnected, cancelling extraction"
            );
        }
    }
}
