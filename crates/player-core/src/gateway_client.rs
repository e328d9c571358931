use crate::{Track, TrackId};
use reqwest::{Client, Url};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamMode {
    Inline,
    Attachment,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayClientError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error("Invalid gateway URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),
}

/// Address of a running gateway; builds its stream URLs.
#[derive(Clone, Debug)]
pub struct GatewayEndpoint {
    base_url: Url,
}

impl GatewayEndpoint {
    pub fn parse(base_url: &str) -> Result<Self, GatewayClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|error| GatewayClientError::InvalidBaseUrl(error.to_string()))?;

        if base_url.cannot_be_a_base() {
            return Err(GatewayClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self { base_url })
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), name);
        url.set_path(&path);
        url.set_query(None);
        url
    }

    pub fn stream_url(&self, source_url: &str, mode: StreamMode) -> String {
        let mut url = self.endpoint("stream");

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("url", source_url);
            if mode == StreamMode::Attachment {
                query.append_pair("download", "1");
            }
        }

        url.to_string()
    }
}

/// Wire shape of a `/search` result.
#[derive(Debug, Deserialize)]
struct RemoteTrack {
    id: String,
    title: String,
    artist: String,
    #[serde(default)]
    artwork: String,
    #[serde(default)]
    duration: String,
    url: String,
}

impl From<RemoteTrack> for Track {
    fn from(remote: RemoteTrack) -> Self {
        Track::new(
            TrackId(remote.id),
            remote.title,
            remote.artist,
            remote.artwork,
            remote.duration,
            remote.url,
        )
    }
}

pub struct GatewayClient {
    client: Client,
    endpoint: GatewayEndpoint,
}

impl GatewayClient {
    pub fn create(endpoint: GatewayEndpoint) -> Result<Self, GatewayClientError> {
        let client = Client::builder().build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &GatewayEndpoint {
        &self.endpoint
    }

    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>, GatewayClientError> {
        let response = self
            .client
            .get(self.endpoint.endpoint("suggestions"))
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayClientError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>, GatewayClientError> {
        let response = self
            .client
            .get(self.endpoint.endpoint("search"))
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayClientError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let tracks: Vec<RemoteTrack> = response.json().await?;

        Ok(tracks.into_iter().map(Track::from).collect())
    }
}
