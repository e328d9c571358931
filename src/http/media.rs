use crate::services::{MediaGateway, SearchError, StreamError};
use crate::types::StreamMode;
use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::web::{Data, Query};
use actix_web::HttpResponse;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub(crate) struct TextQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct StreamQuery {
    url: Option<String>,
    download: Option<String>,
}

pub(crate) async fn get_suggestions(
    gateway: Data<Arc<MediaGateway>>,
    query: Query<TextQuery>,
) -> HttpResponse {
    let suggestions = match &query.q {
        Some(q) => gateway.suggest(q).await,
        None => vec![],
    };

    HttpResponse::Ok().json(suggestions)
}

pub(crate) async fn search_tracks(
    gateway: Data<Arc<MediaGateway>>,
    query: Query<TextQuery>,
) -> Result<HttpResponse, SearchError> {
    let q = query.q.as_deref().ok_or(SearchError::EmptyQuery)?;
    let tracks = gateway.search(q).await?;

    Ok(HttpResponse::Ok().json(tracks))
}

pub(crate) async fn stream_audio(
    gateway: Data<Arc<MediaGateway>>,
    query: Query<StreamQuery>,
) -> Result<HttpResponse, StreamError> {
    let mode = StreamMode::from_download_flag(query.download.as_deref());
    let audio = gateway.open_stream(query.url.as_deref(), mode).await?;

    // Body length is unknown, so the response goes out chunked.
    Ok(HttpResponse::Ok()
        .content_type("audio/mpeg")
        .insert_header((CONTENT_DISPOSITION, audio.mode.content_disposition()))
        .streaming(audio.body))
}
