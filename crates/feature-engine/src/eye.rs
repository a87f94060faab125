//! Eye Geometry Computation

use face_mesh::{Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};

/// Floor applied to eye widths so downstream divisions stay bounded
pub const MIN_EYE_WIDTH: f32 = 0.01;

/// Horizontal bounds of an eye contour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeBounds {
    /// Midpoint between the leftmost and rightmost contour points
    pub center_x: f32,
    /// Horizontal extent, never below [`MIN_EYE_WIDTH`]
    pub width: f32,
}

/// Geometry of one eye in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeGeometry {
    /// Vertical over horizontal spread of the contour
    pub open_ratio: f32,
    /// Contour bounds
    pub bounds: EyeBounds,
    /// Mean of the iris landmarks
    pub iris_center: Landmark,
}

impl EyeGeometry {
    /// Compute geometry for one eye from its contour and iris index sets
    pub fn compute(frame: &LandmarkFrame, contour: &[usize], iris: &[usize]) -> Self {
        Self {
            open_ratio: open_ratio(frame, contour),
            bounds: eye_bounds(frame, contour),
            iris_center: iris_center(frame, iris),
        }
    }

    /// Iris displacement from the eye center, in eye widths.
    /// Positive is toward larger image x.
    pub fn horizontal_offset(&self) -> f32 {
        (self.iris_center.x - self.bounds.center_x) / self.bounds.width
    }

    /// Whether every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.open_ratio.is_finite()
            && self.bounds.center_x.is_finite()
            && self.bounds.width.is_finite()
            && self.iris_center.x.is_finite()
            && self.iris_center.y.is_finite()
    }
}

/// Min/max of x and y over an index set
struct Extent {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

fn extent(frame: &LandmarkFrame, indices: &[usize]) -> Extent {
    frame.select(indices).fold(
        Extent {
            min_x: f32::MAX,
            max_x: f32::MIN,
            min_y: f32::MAX,
            max_y: f32::MIN,
        },
        |e, p| Extent {
            min_x: e.min_x.min(p.x),
            max_x: e.max_x.max(p.x),
            min_y: e.min_y.min(p.y),
            max_y: e.max_y.max(p.y),
        },
    )
}

/// Eye open ratio: vertical spread over horizontal spread.
///
/// A contour with no horizontal spread has ratio 0 (reads as closed).
pub fn open_ratio(frame: &LandmarkFrame, indices: &[usize]) -> f32 {
    let e = extent(frame, indices);
    let vertical = e.max_y - e.min_y;
    let horizontal = e.max_x - e.min_x;

    if horizontal == 0.0 {
        return 0.0;
    }

    let ratio = vertical / horizontal;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Arithmetic mean of the iris landmarks
pub fn iris_center(frame: &LandmarkFrame, indices: &[usize]) -> Landmark {
    let n = indices.len() as f32;
    let (sum_x, sum_y) = frame
        .select(indices)
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));

    Landmark::new(sum_x / n, sum_y / n)
}

/// Horizontal bounds of an eye contour
pub fn eye_bounds(frame: &LandmarkFrame, indices: &[usize]) -> EyeBounds {
    let e = extent(frame, indices);
    EyeBounds {
        center_x: (e.min_x + e.max_x) / 2.0,
        width: (e.max_x - e.min_x).max(MIN_EYE_WIDTH),
    }
}
