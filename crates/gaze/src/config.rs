//! Gaze tracking configuration

use gesture::WinkConfig;
use serde::{Deserialize, Serialize};

use crate::GazeError;

/// Screen size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Gaze tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Screen the gaze is mapped onto
    pub screen: ScreenSize,

    /// Horizontal sensitivity: screen widths per eye width of iris offset
    pub sensitivity: f32,

    /// Calibration samples required before gaze is produced
    pub min_calibration_samples: usize,

    /// Delay after a target is shown before it is sampled (milliseconds)
    pub settle_delay_ms: u64,

    /// Delay after a target is shown before the next one (milliseconds)
    pub advance_delay_ms: u64,

    /// Raw gaze points kept for the weighted average
    pub history_capacity: usize,

    /// Exponential blend factor toward the weighted average (0-1]
    pub smoothing_factor: f32,

    /// Wink detection
    pub wink: WinkConfig,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            screen: ScreenSize::default(),
            sensitivity: 6.0,
            min_calibration_samples: 9,
            settle_delay_ms: 2000,
            advance_delay_ms: 2500,
            history_capacity: 20,
            smoothing_factor: 0.15,
            wink: WinkConfig::default(),
        }
    }
}

impl GazeConfig {
    /// Default config for a given screen
    pub fn for_screen(width: f32, height: f32) -> Self {
        Self {
            screen: ScreenSize { width, height },
            ..Default::default()
        }
    }

    /// Create smooth config (slower, steadier pointer)
    pub fn smooth() -> Self {
        Self {
            history_capacity: 30,
            smoothing_factor: 0.1,
            ..Default::default()
        }
    }

    /// Create snappy config (faster, jittier pointer)
    pub fn snappy() -> Self {
        Self {
            history_capacity: 10,
            smoothing_factor: 0.3,
            ..Default::default()
        }
    }

    /// Check invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), GazeError> {
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            return Err(GazeError::Config(format!(
                "screen must be non-empty, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }
        if self.history_capacity == 0 {
            return Err(GazeError::Config("history_capacity must be > 0".into()));
        }
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(GazeError::Config(format!(
                "smoothing_factor must be in (0, 1], got {}",
                self.smoothing_factor
            )));
        }
        if self.settle_delay_ms >= self.advance_delay_ms {
            return Err(GazeError::Config(
                "settle_delay_ms must be shorter than advance_delay_ms".into(),
            ));
        }
        if !self.sensitivity.is_finite() {
            return Err(GazeError::Config("sensitivity must be finite".into()));
        }
        Ok(())
    }
}
