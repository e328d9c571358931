use super::traits::{ProviderError, UpstreamProvider};
use crate::types::TrackItem;
use async_trait::async_trait;
use search_providers::YouTubeClient;

#[async_trait]
impl UpstreamProvider for YouTubeClient {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ProviderError> {
        YouTubeClient::suggest(self, query)
            .await
            .map_err(|error| ProviderError(Box::new(error)))
    }

    async fn search(&self, query: &str) -> Result<Vec<TrackItem>, ProviderError> {
        let results = YouTubeClient::search(self, query)
            .await
            .map_err(|error| ProviderError(Box::new(error)))?;

        Ok(results.into_iter().map(TrackItem::from).collect())
    }
}
