//! Iris offset to screen coordinate mapping

use feature_engine::FaceFeatures;
use serde::{Deserialize, Serialize};

use crate::config::{GazeConfig, ScreenSize};

/// A point on screen, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    pub x: f32,
    pub y: f32,
}

/// Maps eye features to a raw (unsmoothed) gaze point.
///
/// Only the horizontal axis is tracked. Both eyes' iris offsets are averaged
/// and scaled by the sensitivity; looking toward larger image x moves the
/// gaze left because the camera image is mirrored. The vertical coordinate
/// is pinned to the middle of the screen.
#[derive(Debug, Clone)]
pub struct GazeMapper {
    screen: ScreenSize,
    sensitivity: f32,
    min_samples: usize,
}

impl GazeMapper {
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            screen: config.screen,
            sensitivity: config.sensitivity,
            min_samples: config.min_calibration_samples,
        }
    }

    /// Map features to a screen point.
    ///
    /// Returns `None` while fewer than the minimum calibration samples exist,
    /// or when the geometry is not finite.
    pub fn map(&self, features: &FaceFeatures, calibration_samples: usize) -> Option<GazePoint> {
        if calibration_samples < self.min_samples {
            return None;
        }
        if !features.left.is_finite() || !features.right.is_finite() {
            return None;
        }

        let offset = (features.left.horizontal_offset() + features.right.horizontal_offset()) / 2.0;
        if !offset.is_finite() {
            return None;
        }

        let width = self.screen.width;
        let x = (width * (0.5 - offset * self.sensitivity)).clamp(0.0, width);

        Some(GazePoint {
            x,
            y: self.screen.height / 2.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_mesh::synthetic::FaceBuilder;
    use feature_engine::FeatureExtractor;
    use proptest::prelude::*;

    fn features(offset: f32) -> FaceFeatures {
        FeatureExtractor::new().extract(&FaceBuilder::new().iris_offset(offset).build())
    }

    fn mapper() -> GazeMapper {
        GazeMapper::new(&GazeConfig::for_screen(1200.0, 800.0))
    }

    #[test]
    fn test_centered_iris_maps_to_center() {
        let point = mapper().map(&features(0.0), 12).unwrap();
        assert!((point.x - 600.0).abs() < 0.5);
        assert_eq!(point.y, 400.0);
    }

    #[test]
    fn test_offset_direction_is_mirrored() {
        let m = mapper();
        let right = m.map(&features(0.05), 12).unwrap();
        let left = m.map(&features(-0.05), 12).unwrap();

        // 0.5 - 0.05 * 6 = 0.2 of the width
        assert!((right.x - 240.0).abs() < 1.0);
        assert!((left.x - 960.0).abs() < 1.0);
    }

    #[test]
    fn test_clamped_to_screen() {
        let m = mapper();
        assert_eq!(m.map(&features(0.4), 12).unwrap().x, 0.0);
        assert_eq!(m.map(&features(-0.4), 12).unwrap().x, 1200.0);
    }

    #[test]
    fn test_unavailable_below_minimum_samples() {
        let m = mapper();
        assert!(m.map(&features(0.0), 8).is_none());
        assert!(m.map(&features(0.0), 9).is_some());
    }

    proptest! {
        #[test]
        fn prop_x_within_screen(offset in -1.0f32..1.0) {
            let point = mapper().map(&features(offset), 12).unwrap();
            prop_assert!(point.x >= 0.0 && point.x <= 1200.0);
        }
    }
}
