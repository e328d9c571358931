use crate::{SearchResult, SearchResults, Suggestions, VideoId};
use scraper::error::SelectorErrorKind;
use scraper::{Html, Selector};
use serde_json::Value;

const INITIAL_DATA_MARKER: &str = "ytInitialData = ";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    SelectorError(#[from] SelectorErrorKind<'static>),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error("Initial data has not been found on the page")]
    InitialDataNotFound,
    #[error("Unexpected response shape")]
    UnexpectedShape,
}

/// Suggestion endpoint answers with `[query, [suggestion, ...], ...]`.
pub(crate) fn parse_suggestions(raw_json: &str) -> Result<Suggestions, ParseError> {
    let value: Value = serde_json::from_str(raw_json)?;

    let suggestions = value
        .get(1)
        .and_then(Value::as_array)
        .ok_or(ParseError::UnexpectedShape)?
        .iter()
        .filter_map(|s| s.as_str().map(ToString::to_string))
        .collect();

    Ok(suggestions)
}

pub(crate) fn parse_search_results(raw_html: &str) -> Result<SearchResults, ParseError> {
    let initial_data = extract_initial_data(raw_html)?;

    let mut renderers = vec![];
    collect_video_renderers(&initial_data, &mut renderers);

    let results = renderers
        .into_iter()
        .filter_map(parse_video_renderer)
        .collect();

    Ok(results)
}

fn extract_initial_data(raw_html: &str) -> Result<Value, ParseError> {
    let html = Html::parse_document(raw_html);
    let script_selector = Selector::parse("script")?;

    for script in html.select(&script_selector) {
        let text = script.text().collect::<String>();

        let start = match text.find(INITIAL_DATA_MARKER) {
            Some(position) => position + INITIAL_DATA_MARKER.len(),
            None => continue,
        };

        // The assignment is followed by `;` and possibly more statements.
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();

        return match values.next() {
            Some(value) => Ok(value?),
            None => Err(ParseError::InitialDataNotFound),
        };
    }

    Err(ParseError::InitialDataNotFound)
}

fn collect_video_renderers<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(renderer) = map.get("videoRenderer") {
                out.push(renderer);
                return;
            }

            for child in map.values() {
                collect_video_renderers(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_video_renderers(item, out);
            }
        }
        _ => (),
    }
}

fn parse_video_renderer(renderer: &Value) -> Option<SearchResult> {
    let video_id: VideoId = renderer.get("videoId")?.as_str()?.into();

    let title = renderer.get("title").and_then(text_of).unwrap_or_default();
    let author = renderer
        .get("ownerText")
        .or_else(|| renderer.get("longBylineText"))
        .and_then(text_of)
        .unwrap_or_default();
    let duration = renderer
        .get("lengthText")
        .and_then(text_of)
        .unwrap_or_default();
    let thumbnail = renderer
        .pointer("/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbnails| thumbnails.last())
        .and_then(|thumbnail| thumbnail.get("url"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_else(|| video_id.default_thumbnail());

    Some(SearchResult {
        url: video_id.watch_url(),
        video_id,
        title,
        author,
        thumbnail,
        duration,
    })
}

fn text_of(value: &Value) -> Option<String> {
    if let Some(text) = value.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let runs = value.get("runs")?.as_array()?;

    Some(
        runs.iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect::<String>(),
    )
}
