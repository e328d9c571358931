use super::traits::{AudioExtractor, AudioSource, ExtractError, ProviderError, UpstreamProvider};
use crate::types::TrackItem;
use actix_web::web::Bytes;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn make_track(index: usize) -> TrackItem {
    TrackItem {
        id: format!("video{}", index),
        title: format!("Track {}", index),
        artist: "Lofi Girl".into(),
        artwork: format!("https://i.ytimg.com/vi/video{}/hqdefault.jpg", index),
        duration: "3:00".into(),
        url: format!("https://youtube.com/watch?v=video{}", index),
    }
}

#[derive(Default)]
pub(crate) struct ProviderMock {
    pub(crate) suggest_calls: AtomicUsize,
    pub(crate) search_calls: AtomicUsize,
}

#[async_trait]
impl UpstreamProvider for ProviderMock {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ProviderError> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);

        match query {
            "lofi" => Ok(vec!["lofi hip hop".into(), "lofi girl".into()]),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(vec!["too late".into()])
            }
            _ => Err(ProviderError(Box::new(Error::from(ErrorKind::ConnectionReset)))),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackItem>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        match query {
            "lofi" => Ok((0..20).map(make_track).collect()),
            "short" => Ok((0..3).map(make_track).collect()),
            _ => Err(ProviderError(Box::new(Error::from(ErrorKind::ConnectionReset)))),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Chunk {
    Data(&'static [u8]),
    Failure,
}

/// Replays scripted chunks and raises `cancelled` once the source is dropped.
pub(crate) struct ExtractorMock {
    script: Option<Vec<Chunk>>,
    pub(crate) extractions: AtomicUsize,
    pub(crate) cancelled: Arc<AtomicBool>,
}

impl ExtractorMock {
    pub(crate) fn new(script: Vec<Chunk>) -> Self {
        Self {
            script: Some(script),
            extractions: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn failing_to_start() -> Self {
        Self {
            script: None,
            extractions: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

struct SourceMock {
    chunks: VecDeque<Chunk>,
    cancelled: Arc<AtomicBool>,
}

#[async_trait]
impl AudioSource for SourceMock {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, ExtractError> {
        match self.chunks.pop_front() {
            Some(Chunk::Data(data)) => Ok(Some(Bytes::from_static(data))),
            Some(Chunk::Failure) => Err(ExtractError::ExitStatus("exit status: 1".into())),
            None => Ok(None),
        }
    }
}

impl Drop for SourceMock {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioExtractor for ExtractorMock {
    async fn extract(&self, _source_url: &str) -> Result<Box<dyn AudioSource>, ExtractError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);

        let chunks = match &self.script {
            Some(script) => script.iter().cloned().collect(),
            None => return Err(ExtractError::Spawn(Error::from(ErrorKind::NotFound))),
        };

        Ok(Box::new(SourceMock {
            chunks,
            cancelled: Arc::clone(&self.cancelled),
        }))
    }
}
