//! Detector-eye to user-eye mapping

use feature_engine::DetectedEye;
use serde::{Deserialize, Serialize};

/// Eye from the user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserEye {
    Left,
    Right,
}

impl UserEye {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// The one place the camera mirroring is resolved: the detector's right
/// eye is the user's left eye and vice versa. Not configurable.
pub fn user_eye(detected: DetectedEye) -> UserEye {
    match detected {
        DetectedEye::Left => UserEye::Right,
        DetectedEye::Right => UserEye::Left,
    }
}
