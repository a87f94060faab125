//! Wink detector
//!
//! Per-eye debounced state machine. A wink fires when exactly one eye has
//! been continuously closed for `min_closed_ms` and that eye has not fired
//! within `cooldown_ms`. Both eyes closed together is treated as a blink and
//! resets all accumulated closure.

use feature_engine::{DetectedEye, FaceFeatures};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::eye::{user_eye, UserEye};

/// Wink detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WinkConfig {
    /// An eye is open iff its open ratio is strictly above this
    pub open_threshold: f32,
    /// Sustained single-eye closure required before a wink fires (milliseconds)
    pub min_closed_ms: u64,
    /// Minimum time between two winks of the same eye (milliseconds)
    pub cooldown_ms: u64,
}

impl Default for WinkConfig {
    fn default() -> Self {
        Self {
            open_threshold: 0.2,
            min_closed_ms: 500,
            cooldown_ms: 1500,
        }
    }
}

impl WinkConfig {
    /// Shorter cooldown for practiced users
    pub fn responsive() -> Self {
        Self {
            cooldown_ms: 1000,
            ..Default::default()
        }
    }

    /// Longer hold and cooldown for users with involuntary twitches
    pub fn deliberate() -> Self {
        Self {
            min_closed_ms: 800,
            cooldown_ms: 2000,
            ..Default::default()
        }
    }
}

/// Open/closed classification of one eye in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeOpenness {
    Open,
    Closed,
}

/// Classify an open ratio. The threshold itself counts as closed.
pub fn classify(ratio: f32, open_threshold: f32) -> EyeOpenness {
    if ratio > open_threshold {
        EyeOpenness::Open
    } else {
        EyeOpenness::Closed
    }
}

/// Closure bookkeeping for one eye
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EyeWinkState {
    /// Start of the current uninterrupted closure
    pub closed_since: Option<u64>,
    /// Time of the last wink fired for this eye
    pub last_event_ms: Option<u64>,
}

/// A detected wink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinkEvent {
    /// User-side eye that winked
    pub eye: UserEye,
    /// Frame time at which the wink fired
    pub timestamp_ms: u64,
    /// How long the eye had been closed when it fired
    pub closed_ms: u64,
}

/// Wink gesture detector
#[derive(Debug, Clone)]
pub struct WinkDetector {
    config: WinkConfig,
    left: EyeWinkState,
    right: EyeWinkState,
}

impl WinkDetector {
    /// Create a new wink detector
    pub fn new(config: WinkConfig) -> Self {
        debug!("Creating wink detector with config: {:?}", config);
        Self {
            config,
            left: EyeWinkState::default(),
            right: EyeWinkState::default(),
        }
    }

    /// Feed one frame of features
    pub fn update(&mut self, features: &FaceFeatures, now_ms: u64) -> Option<WinkEvent> {
        self.update_ratios(features.left.open_ratio, features.right.open_ratio, now_ms)
    }

    /// Feed one frame of open ratios, in detector eye naming
    pub fn update_ratios(&mut self, left_ratio: f32, right_ratio: f32, now_ms: u64) -> Option<WinkEvent> {
        let threshold = self.config.open_threshold;
        let left = classify(left_ratio, threshold);
        let right = classify(right_ratio, threshold);

        match (left, right) {
            (EyeOpenness::Closed, EyeOpenness::Closed) => {
                debug!("Both eyes closed, treating as blink");
                self.clear_closures();
                None
            }
            (EyeOpenness::Open, EyeOpenness::Open) => {
                self.clear_closures();
                None
            }
            (EyeOpenness::Closed, EyeOpenness::Open) => {
                self.accumulate(user_eye(DetectedEye::Left), now_ms)
            }
            (EyeOpenness::Open, EyeOpenness::Closed) => {
                self.accumulate(user_eye(DetectedEye::Right), now_ms)
            }
        }
    }

    /// One eye closed: advance its closure, drop the other's
    fn accumulate(&mut self, eye: UserEye, now_ms: u64) -> Option<WinkEvent> {
        self.state_mut(eye.other()).closed_since = None;

        let min_closed_ms = self.config.min_closed_ms;
        let cooldown_ms = self.config.cooldown_ms;
        let state = self.state_mut(eye);

        let since = *state.closed_since.get_or_insert(now_ms);
        let closed_ms = now_ms.saturating_sub(since);
        let cooled_down = state
            .last_event_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= cooldown_ms);

        if closed_ms < min_closed_ms {
            return None;
        }
        if !cooled_down {
            debug!("{} wink suppressed: in cooldown period", eye.as_str());
            return None;
        }

        state.last_event_ms = Some(now_ms);
        info!("{} wink detected after {}ms closed", eye.as_str(), closed_ms);

        Some(WinkEvent {
            eye,
            timestamp_ms: now_ms,
            closed_ms,
        })
    }

    fn clear_closures(&mut self) {
        self.left.closed_since = None;
        self.right.closed_since = None;
    }

    fn state_mut(&mut self, eye: UserEye) -> &mut EyeWinkState {
        match eye {
            UserEye::Left => &mut self.left,
            UserEye::Right => &mut self.right,
        }
    }

    /// Current bookkeeping for a user-side eye
    pub fn state(&self, eye: UserEye) -> &EyeWinkState {
        match eye {
            UserEye::Left => &self.left,
            UserEye::Right => &self.right,
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &WinkConfig {
        &self.config
    }

    /// Forget all closures and cooldowns
    pub fn reset(&mut self) {
        self.left = EyeWinkState::default();
        self.right = EyeWinkState::default();
    }
}

impl Default for WinkDetector {
    fn default() -> Self {
        Self::new(WinkConfig::default())
    }
}
