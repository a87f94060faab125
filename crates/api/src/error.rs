//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use word_board::BoardError;

/// Errors returned by HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("A word request is already in progress")]
    Busy,

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Metrics unavailable: {0}")]
    Metrics(String),
}

/// Error body, same shape as the language backend's
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Busy => StatusCode::CONFLICT,
            ApiError::Board(BoardError::Backend(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Board(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Metrics(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            ApiError::Board(e) => e.user_message(),
            other => other.to_string(),
        };
        (self.status(), Json(ErrorBody { detail })).into_response()
    }
}
