//! Tracker state snapshot

use feature_engine::HeadPose;
use serde::{Deserialize, Serialize};

use crate::mapper::GazePoint;

/// Tracker mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    /// Started, never calibrated
    #[default]
    Idle,
    /// Showing calibration targets
    Calibrating,
    /// Producing gaze (when enough samples were collected)
    Tracking,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::Idle => "idle",
            TrackingMode::Calibrating => "calibrating",
            TrackingMode::Tracking => "tracking",
        }
    }
}

/// Position within the calibration sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationProgress {
    /// Index of the target currently shown
    pub current_index: usize,
    /// Number of targets in the sequence
    pub total: usize,
}

/// Per-eye open state, user side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeStatus {
    pub open: bool,
    pub ratio: f32,
}

/// Observable tracker state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackerState {
    pub mode: TrackingMode,
    pub calibration: CalibrationProgress,
    /// Calibration samples currently stored
    pub samples_collected: usize,
    /// Whether gaze can be produced from the stored samples
    pub gaze_available: bool,
    /// Whether the latest frame contained a face
    pub face_detected: bool,
    /// Smoothed gaze point
    pub gaze_point: Option<GazePoint>,
    /// Screen section 1-4 under the smoothed gaze
    pub current_section: Option<u8>,
    pub left_eye: Option<EyeStatus>,
    pub right_eye: Option<EyeStatus>,
    pub head_pose: Option<HeadPose>,
    /// Human-readable status line
    pub status: String,
    /// Timestamp of the latest frame
    pub last_frame_ms: Option<u64>,
}

impl TrackerState {
    pub fn is_calibrating(&self) -> bool {
        self.mode == TrackingMode::Calibrating
    }

    pub fn is_tracking(&self) -> bool {
        self.mode == TrackingMode::Tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serializes_lowercase() {
        let json = serde_json::to_string(&TrackingMode::Calibrating).unwrap();
        assert_eq!(json, "\"calibrating\"");
        assert_eq!(TrackingMode::Tracking.as_str(), "tracking");
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = TrackerState::default();
        assert_eq!(state.mode, TrackingMode::Idle);
        assert!(!state.is_calibrating());
        assert!(!state.is_tracking());
        assert!(state.gaze_point.is_none());
    }
}
