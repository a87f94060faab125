//! Landmark frame types

use serde::{Deserialize, Serialize};

use crate::{FaceMeshError, REFINED_MESH_POINTS};

/// A single normalized landmark in image space ([0,1] x [0,1])
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Landmarks of one detected face for one video frame.
///
/// Construction validates the point count, so every index in
/// [`crate::indices`] is in range for a frame that exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkFrame {
    points: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Create a frame from detector output
    pub fn from_points(points: Vec<Landmark>) -> Result<Self, FaceMeshError> {
        if points.len() < REFINED_MESH_POINTS {
            return Err(FaceMeshError::TooFewLandmarks {
                found: points.len(),
                required: REFINED_MESH_POINTS,
            });
        }
        Ok(Self { points })
    }

    /// A full refined mesh with every point at `point`
    pub(crate) fn filled(point: Landmark) -> Self {
        Self {
            points: vec![point; REFINED_MESH_POINTS],
        }
    }

    /// Get landmark at index
    ///
    /// Panics on an index outside the mesh, which is a caller bug.
    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    /// Iterate over the landmarks selected by an index set
    pub fn select<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = Landmark> + 'a {
        indices.iter().map(move |&i| self.points[i])
    }

    /// Number of landmarks
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replace a landmark (used when building synthetic frames)
    pub fn set(&mut self, index: usize, point: Landmark) {
        self.points[index] = point;
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = FaceMeshError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<LandmarkFrame> for Vec<Landmark> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_short_frame() {
        let err = LandmarkFrame::from_points(vec![Landmark::default(); 468]).unwrap_err();
        match err {
            FaceMeshError::TooFewLandmarks { found, required } => {
                assert_eq!(found, 468);
                assert_eq!(required, 478);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_follows_index_order() {
        let mut frame = LandmarkFrame::from_points(vec![Landmark::default(); 478]).unwrap();
        frame.set(10, Landmark::new(0.1, 0.2));
        frame.set(20, Landmark::new(0.3, 0.4));

        let picked: Vec<_> = frame.select(&[20, 10]).collect();
        assert_eq!(picked, vec![Landmark::new(0.3, 0.4), Landmark::new(0.1, 0.2)]);
    }

    #[test]
    fn test_deserialize_validates_count() {
        let short = serde_json::to_string(&vec![Landmark::default(); 5]).unwrap();
        assert!(serde_json::from_str::<LandmarkFrame>(&short).is_err());

        // MediaPipe emits a z coordinate; it is ignored
        let point = r#"{"x":0.5,"y":0.25,"z":-0.01}"#;
        let json = format!("[{}]", vec![point; 478].join(","));
        let frame: LandmarkFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame.point(477), Landmark::new(0.5, 0.25));
    }

    proptest! {
        #[test]
        fn prop_any_frame_with_enough_points_is_accepted(extra in 0usize..32) {
            let frame = LandmarkFrame::from_points(vec![Landmark::default(); 478 + extra]);
            prop_assert!(frame.is_ok());
            prop_assert_eq!(frame.unwrap().len(), 478 + extra);
        }
    }
}
