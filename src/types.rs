use serde::Serialize;

/// Track as returned by `/search`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct TrackItem {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) artwork: String,
    pub(crate) duration: String,
    pub(crate) url: String,
}

impl From<search_providers::SearchResult> for TrackItem {
    fn from(result: search_providers::SearchResult) -> Self {
        Self {
            id: result.video_id.to_string(),
            title: result.title,
            artist: result.author,
            artwork: result.thumbnail,
            duration: result.duration,
            url: result.url,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StreamMode {
    Inline,
    Attachment,
}

impl StreamMode {
    pub(crate) fn from_download_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("1") => StreamMode::Attachment,
            _ => StreamMode::Inline,
        }
    }

    pub(crate) fn content_disposition(&self) -> String {
        let disposition = match self {
            StreamMode::Inline => "inline",
            StreamMode::Attachment => "attachment",
        };

        format!(r#"{}; filename="audio.mp3""#, disposition)
    }
}
