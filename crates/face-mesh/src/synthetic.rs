//! Synthetic faces with controlled eye geometry
//!
//! Used to produce replay fixtures and deterministic frames in tests of the
//! downstream crates.

use std::f32::consts::PI;

use crate::frame::{Landmark, LandmarkFrame};
use crate::indices;

/// Builder for a frontal face with parameterised eyes
#[derive(Debug, Clone)]
pub struct FaceBuilder {
    left_open_ratio: f32,
    right_open_ratio: f32,
    iris_offset: f32,
    eye_width: f32,
    origin: Landmark,
}

impl Default for FaceBuilder {
    fn default() -> Self {
        Self {
            left_open_ratio: 0.3,
            right_open_ratio: 0.3,
            iris_offset: 0.0,
            eye_width: 0.08,
            origin: Landmark::new(0.5, 0.45),
        }
    }
}

impl FaceBuilder {
    /// Both eyes open, irises centered
    pub fn new() -> Self {
        Self::default()
    }

    /// Open ratio of the detector-left eye
    pub fn left_open_ratio(mut self, ratio: f32) -> Self {
        self.left_open_ratio = ratio;
        self
    }

    /// Open ratio of the detector-right eye
    pub fn right_open_ratio(mut self, ratio: f32) -> Self {
        self.right_open_ratio = ratio;
        self
    }

    /// Horizontal iris offset of both eyes, in eye widths from the eye center
    pub fn iris_offset(mut self, offset: f32) -> Self {
        self.iris_offset = offset;
        self
    }

    /// Horizontal extent of each eye contour
    pub fn eye_width(mut self, width: f32) -> Self {
        self.eye_width = width;
        self
    }

    /// Face center in image space
    pub fn origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Landmark::new(x, y);
        self
    }

    pub fn build(&self) -> LandmarkFrame {
        let mut frame = LandmarkFrame::filled(self.origin);

        let eye_y = self.origin.y - 0.03;
        let left_center = Landmark::new(self.origin.x - 0.1, eye_y);
        let right_center = Landmark::new(self.origin.x + 0.1, eye_y);

        self.place_eye(&mut frame, &indices::LEFT_EYE, left_center, self.left_open_ratio);
        self.place_eye(&mut frame, &indices::RIGHT_EYE, right_center, self.right_open_ratio);
        self.place_iris(&mut frame, &indices::LEFT_IRIS, left_center);
        self.place_iris(&mut frame, &indices::RIGHT_IRIS, right_center);

        frame.set(indices::NOSE_TIP, Landmark::new(self.origin.x, self.origin.y + 0.05));
        frame.set(indices::CHIN, Landmark::new(self.origin.x, self.origin.y + 0.25));

        frame
    }

    /// Contour points on an ellipse. Positions 0 and 8 of each contour are
    /// the eye corners (33/133 and 362/263) and land on the horizontal extremes.
    fn place_eye(&self, frame: &mut LandmarkFrame, contour: &[usize], center: Landmark, ratio: f32) {
        let half_w = self.eye_width / 2.0;
        let half_h = self.eye_width * ratio / 2.0;
        let n = contour.len() as f32;

        for (k, &idx) in contour.iter().enumerate() {
            let angle = 2.0 * PI * k as f32 / n;
            let (dx, dy) = match k {
                0 => (-half_w, 0.0),
                8 => (half_w, 0.0),
                4 => (0.0, -half_h),
                12 => (0.0, half_h),
                _ => (-half_w * angle.cos(), -half_h * angle.sin()),
            };
            frame.set(idx, Landmark::new(center.x + dx, center.y + dy));
        }
    }

    fn place_iris(&self, frame: &mut LandmarkFrame, iris: &[usize], eye_center: Landmark) {
        let center = Landmark::new(eye_center.x + self.iris_offset * self.eye_width, eye_center.y);
        let r = self.eye_width * 0.15;
        let rim = [(r, 0.0), (0.0, -r), (-r, 0.0), (0.0, r)];

        frame.set(iris[0], center);
        for (&idx, (dx, dy)) in iris[1..].iter().zip(rim) {
            frame.set(idx, Landmark::new(center.x + dx, center.y + dy));
        }
    }
}
