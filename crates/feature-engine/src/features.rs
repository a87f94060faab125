//! Per-frame feature extraction

use face_mesh::{indices, LandmarkFrame};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::eye::EyeGeometry;
use crate::head_pose::HeadPose;

/// Eye as named by the detector (image space, not the user's side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectedEye {
    Left,
    Right,
}

/// All geometric features of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceFeatures {
    /// Detector-left eye
    pub left: EyeGeometry,
    /// Detector-right eye
    pub right: EyeGeometry,
    /// Head pose estimate
    pub head_pose: HeadPose,
}

impl FaceFeatures {
    pub fn eye(&self, eye: DetectedEye) -> &EyeGeometry {
        match eye {
            DetectedEye::Left => &self.left,
            DetectedEye::Right => &self.right,
        }
    }
}

/// Geometric feature extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a single frame. Pure, no state is kept.
    pub fn extract(&self, frame: &LandmarkFrame) -> FaceFeatures {
        let left = EyeGeometry::compute(frame, &indices::LEFT_EYE, &indices::LEFT_IRIS);
        let right = EyeGeometry::compute(frame, &indices::RIGHT_EYE, &indices::RIGHT_IRIS);
        let head_pose = HeadPose::estimate(frame);

        trace!(
            left_ratio = left.open_ratio,
            right_ratio = right.open_ratio,
            "Extracted eye features"
        );

        FaceFeatures {
            left,
            right,
            head_pose,
        }
    }
}
