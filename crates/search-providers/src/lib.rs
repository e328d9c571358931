mod youtube;

use serde::{Deserialize, Serialize};
use std::ops::Deref;

pub use youtube::*;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub video_id: VideoId,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    pub duration: String,
    pub url: String,
}

pub type SearchResults = Vec<SearchResult>;

pub type Suggestions = Vec<String>;

#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct VideoId(pub(crate) String);

impl VideoId {
    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.0)
    }

    pub fn default_thumbnail(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        VideoId(value.to_string())
    }
}

impl Deref for VideoId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
