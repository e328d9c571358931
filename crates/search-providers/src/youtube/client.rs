use crate::youtube::parser::{parse_search_results, parse_suggestions, ParseError};
use crate::{SearchResults, Suggestions};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

const YOUTUBE_HOST: &str = "https://www.youtube.com";
const SUGGEST_ENDPOINT: &str = "https://suggestqueries.google.com/complete/search";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum YouTubeClientError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),
}

pub struct YouTubeClient {
    client: Client,
}

impl YouTubeClient {
    pub fn create() -> Result<Self, YouTubeClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    pub async fn suggest(&self, query_str: &str) -> Result<Suggestions, YouTubeClientError> {
        #[derive(Serialize)]
        struct Query<'a> {
            client: &'a str,
            ds: &'a str,
            q: &'a str,
        }

        let query = Query {
            client: "firefox",
            ds: "yt",
            q: query_str,
        };

        let response = self
            .client
            .get(SUGGEST_ENDPOINT)
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(YouTubeClientError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let raw_json = response.text().await?;

        Ok(parse_suggestions(&raw_json)?)
    }

    pub async fn search(&self, query_str: &str) -> Result<SearchResults, YouTubeClientError> {
        #[derive(Serialize)]
        struct Query<'a> {
            search_query: &'a str,
        }

        let response = self
            .client
            .get(format!("{}/results", YOUTUBE_HOST))
            .query(&Query {
                search_query: query_str,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(YouTubeClientError::UnexpectedStatus(
                response.status().as_u16(),
            ));
        }

        let raw_html = response.text().await?;
        let results = parse_search_results(&raw_html)?;

        debug!(query = query_str, count = results.len(), "Search page parsed");

        Ok(results)
    }
}
