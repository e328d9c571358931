use crate::services::{SearchError, StreamError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
            SearchError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            SearchError::EmptyQuery => "Query is missing",
            SearchError::Provider(_) => "Search failed",
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl ResponseError for StreamError {
    fn status_code(&self) -> StatusCode {
        match self {
            StreamError::MissingSource => StatusCode::BAD_REQUEST,
            StreamError::ResolutionFailed(_) | StreamError::Aborted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            StreamError::MissingSource => "Track URL is missing",
            StreamError::ResolutionFailed(_) | StreamError::Aborted(_) => {
                "Failed to stream audio"
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
