use crate::TrackId;
use serde::{Deserialize, Serialize};

/// A playable audio item.
///
/// Values are never mutated in place; `with_local_uri` produces the
/// downloaded copy of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    title: String,
    artist: String,
    #[serde(default)]
    artwork: String,
    #[serde(default)]
    duration: String,
    url: String,
    #[serde(default, rename = "localUri", skip_serializing_if = "Option::is_none")]
    local_uri: Option<String>,
}

impl Track {
    pub fn new(
        id: TrackId,
        title: String,
        artist: String,
        artwork: String,
        duration: String,
        source_url: String,
    ) -> Self {
        Self {
            id,
            title,
            artist,
            artwork,
            duration,
            url: source_url,
            local_uri: None,
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn artwork(&self) -> &str {
        &self.artwork
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    /// Upstream reference the gateway knows how to stream.
    pub fn source_url(&self) -> &str {
        &self.url
    }

    pub fn local_uri(&self) -> Option<&str> {
        self.local_uri.as_deref()
    }

    pub fn with_local_uri(&self, local_uri: String) -> Track {
        Track {
            local_uri: Some(local_uri),
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) fn make_track(id: &str) -> Track {
    Track::new(
        id.into(),
        format!("Title {}", id),
        "Artist".into(),
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
        "3:00".into(),
        format!("https://youtube.com/watch?v={}", id),
    )
}
