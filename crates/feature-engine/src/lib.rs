//! Feature Engineering Engine
//!
//! Derives per-frame geometric features from face mesh landmarks: eye
//! openness, eye bounds, iris centers, and head pose.

mod eye;
mod features;
mod head_pose;

pub use eye::{eye_bounds, iris_center, open_ratio, EyeBounds, EyeGeometry, MIN_EYE_WIDTH};
pub use features::{DetectedEye, FaceFeatures, FeatureExtractor};
pub use head_pose::HeadPose;
