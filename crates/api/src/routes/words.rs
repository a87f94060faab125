//! Word Board Routes

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use word_board::BoardSnapshot;

use crate::{ApiError, AppState};

/// Show the next page of words
pub async fn next_page(State(state): State<Arc<AppState>>) -> Result<Json<BoardSnapshot>, ApiError> {
    let mut board = state.board.try_lock().map_err(|_| ApiError::Busy)?;
    state.mark_busy();
    let result = board.next_page().await;
    state.publish(&board);

    if !result? {
        debug!("Next page unavailable");
    }
    Ok(Json(board.snapshot()))
}

/// Show the previous page of words
pub async fn prev_page(State(state): State<Arc<AppState>>) -> Result<Json<BoardSnapshot>, ApiError> {
    let mut board = state.board.try_lock().map_err(|_| ApiError::Busy)?;
    if !board.prev_page() {
        debug!("Already on the first page");
    }
    state.publish(&board);
    Ok(Json(board.snapshot()))
}

/// Audio of the most recent utterance
pub async fn latest_speech(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let audio = state.last_audio.read().await.clone();
    match audio {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response()),
        None => Err(ApiError::NotFound("no speech yet".to_string())),
    }
}
