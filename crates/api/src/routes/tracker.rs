//! Tracker Routes

use axum::{extract::State, Json};
use face_mesh::{LandmarkFrame, SourceFrame};
use gaze::{CalibrationEvent, CalibrationPoint, GazePoint, TrackerState};
use gesture::WinkEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use word_board::BoardSnapshot;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_ms: u64,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_ms: state.clock.now_ms(),
    })
}

/// Everything the interface renders
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub tracker: TrackerState,
    pub board: BoardSnapshot,
    /// Target to draw while calibrating
    pub calibration_target: Option<CalibrationPoint>,
}

/// Get tracker and board state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let (tracker, calibration_target) = {
        let tracker = state.tracker.lock().await;
        (
            tracker.state().clone(),
            tracker.calibration().current_target(),
        )
    };

    Json(StateResponse {
        tracker,
        board: state.board_snapshot(),
        calibration_target,
    })
}

/// Detector output for one frame, stamped on arrival
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    #[serde(default)]
    pub face: Option<LandmarkFrame>,
}

#[derive(Debug, Serialize)]
pub struct FrameResponse {
    pub timestamp_ms: u64,
    pub face_detected: bool,
    pub gaze: Option<GazePoint>,
    pub section: Option<u8>,
    pub wink: Option<WinkEvent>,
    pub calibration: Vec<CalibrationEvent>,
}

/// Ingest one landmark frame
pub async fn ingest_frame(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FrameRequest>,
) -> Json<FrameResponse> {
    let timestamp_ms = state.clock.now_ms();
    let outcome = state
        .process_frame(SourceFrame {
            timestamp_ms,
            face: request.face,
        })
        .await;

    Json(FrameResponse {
        timestamp_ms,
        face_detected: outcome.face_detected,
        gaze: outcome.gaze,
        section: outcome.section,
        wink: outcome.wink,
        calibration: outcome.calibration,
    })
}

/// Start or restart calibration
pub async fn start_calibration(State(state): State<Arc<AppState>>) -> Json<CalibrationEvent> {
    let now_ms = state.clock.now_ms();
    let event = state.tracker.lock().await.start_calibration(now_ms);
    info!("Calibration started");
    Json(event)
}

/// Reset tracking to idle
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<TrackerState> {
    let mut tracker = state.tracker.lock().await;
    tracker.reset();
    Json(tracker.state().clone())
}
