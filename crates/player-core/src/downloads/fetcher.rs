use crate::downloads::traits::{FetchError, FetchOutcome, Progress, TrackFetcher};
use async_trait::async_trait;
use futures_lite::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct HttpTrackFetcher {
    client: Client,
}

impl HttpTrackFetcher {
    pub fn create() -> Result<Self, FetchError> {
        let client = Client::builder().build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TrackFetcher for HttpTrackFetcher {
    async fn fetch(
        &self,
        url: &str,
        destination: &Path,
        progress: Option<Progress<'_>>,
    ) -> Result<FetchOutcome, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            debug!(url, status, "Fetch rejected by server");
            return Ok(FetchOutcome {
                status,
                bytes_written: 0,
            });
        }

        // Chunked gateway responses carry no length; progress stays silent then.
        let total = response.content_length().filter(|length| *length > 0);

        let mut file = File::create(destination).await?;
        let mut bytes_written = 0u64;

        let stream = response.bytes_stream();
        futures_lite::pin!(stream);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;

            if let (Some(progress), Some(total)) = (progress, total) {
                progress((bytes_written as f64 / total as f64).min(1.0));
            }
        }

        file.flush().await?;
        file.sync_all().await?;

        debug!(url, bytes_written, "Fetch finished");

        Ok(FetchOutcome {
            status,
            bytes_written,
        })
    }
}
