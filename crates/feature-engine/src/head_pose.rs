//! Head pose estimate from face mesh anchors

use face_mesh::{indices, LandmarkFrame};
use serde::{Deserialize, Serialize};

/// Head pose (Euler angles)
///
/// A coarse 2D estimate for display. It is not used to correct gaze.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Yaw (left-right rotation) in degrees
    pub yaw: f32,
    /// Pitch (up-down tilt) in degrees
    pub pitch: f32,
    /// Roll (side tilt) in degrees
    pub roll: f32,
}

impl HeadPose {
    /// Estimate from the nose tip, outer eye corners, and chin
    pub fn estimate(frame: &LandmarkFrame) -> Self {
        let nose = frame.point(indices::NOSE_TIP);
        let left = frame.point(indices::LEFT_EYE_OUTER);
        let right = frame.point(indices::RIGHT_EYE_OUTER);
        let chin = frame.point(indices::CHIN);

        let eye_mid_x = (left.x + right.x) / 2.0;
        let eye_mid_y = (left.y + right.y) / 2.0;
        let interocular = (right.x - left.x).hypot(right.y - left.y);

        let yaw = if interocular > 0.0 {
            (nose.x - eye_mid_x).atan2(interocular).to_degrees()
        } else {
            0.0
        };
        let pitch = (nose.y - eye_mid_y).atan2(chin.y - eye_mid_y).to_degrees();
        let roll = (right.y - left.y).atan2(right.x - left.x).to_degrees();

        Self { yaw, pitch, roll }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_mesh::synthetic::FaceBuilder;
    use face_mesh::Landmark;

    #[test]
    fn test_frontal_face_has_no_yaw_or_roll() {
        let pose = HeadPose::estimate(&FaceBuilder::new().build());
        assert!(pose.yaw.abs() < 1e-3);
        assert!(pose.roll.abs() < 1e-3);
        assert!(pose.pitch > 0.0 && pose.pitch < 90.0);
    }

    #[test]
    fn test_pose_does_not_depend_on_face_position() {
        let centered = HeadPose::estimate(&FaceBuilder::new().build());
        let shifted = HeadPose::estimate(&FaceBuilder::new().origin(0.3, 0.6).build());
        assert!((centered.pitch - shifted.pitch).abs() < 1e-3);
        assert!(shifted.yaw.abs() < 1e-3);
        assert!(shifted.roll.abs() < 1e-3);
    }

    #[test]
    fn test_tilted_face_has_roll() {
        let mut frame = FaceBuilder::new().build();
        let right = frame.point(indices::RIGHT_EYE_OUTER);
        frame.set(indices::RIGHT_EYE_OUTER, Landmark::new(right.x, right.y + 0.05));

        let pose = HeadPose::estimate(&frame);
        assert!(pose.roll > 5.0);
    }

    #[test]
    fn test_turned_face_has_yaw() {
        let mut frame = FaceBuilder::new().build();
        let nose = frame.point(indices::NOSE_TIP);
        frame.set(indices::NOSE_TIP, Landmark::new(nose.x + 0.05, nose.y));

        assert!(HeadPose::estimate(&frame).yaw > 5.0);
    }
}
