//! Gaze Tracking Core
//!
//! Per-frame gaze pipeline driven by face mesh landmarks:
//! - Calibration target sequencing and sample collection
//! - Iris offset to screen coordinate mapping
//! - Two-stage smoothing and screen section selection
//! - Wink dispatch gated on tracking mode

pub mod calibration;
pub mod config;
pub mod filter;
pub mod mapper;
pub mod state;
pub mod timer;
pub mod tracker;

pub use calibration::{
    CalibrationController, CalibrationEvent, CalibrationPoint, CalibrationSample, CalibrationStore,
    LatestFrame, CALIBRATION_POINTS,
};
pub use config::{GazeConfig, ScreenSize};
pub use filter::{screen_section, GazeFilter};
pub use mapper::{GazeMapper, GazePoint};
pub use state::{CalibrationProgress, EyeStatus, TrackerState, TrackingMode};
pub use timer::{TimerHandle, TimerQueue};
pub use tracker::{FrameOutcome, GazeTracker};

use thiserror::Error;

/// Gaze core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GazeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calibration index {index} out of range (0..{total})")]
    CalibrationIndex { index: usize, total: usize },
}
