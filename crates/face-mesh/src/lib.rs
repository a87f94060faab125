//! Face Mesh Landmarks for Gaze Tracking
//!
//! Provides the per-frame landmark representation consumed by the gaze core.
//! Supports:
//! - Refined face mesh frames (478 points, irises included)
//! - Fixed anatomical index sets for eyes, irises, and head-pose anchors
//! - Landmark sources (recorded JSON-lines replay)

pub mod frame;
pub mod indices;
pub mod source;
pub mod synthetic;

pub use frame::{Landmark, LandmarkFrame};
pub use source::{FrameSource, JsonLinesSource, SourceFrame};

use thiserror::Error;

/// Number of points in a refined face mesh (468 face + 10 iris)
pub const REFINED_MESH_POINTS: usize = 478;

/// Face mesh error types
#[derive(Error, Debug)]
pub enum FaceMeshError {
    #[error("Landmark frame has {found} points, at least {required} required")]
    TooFewLandmarks { found: usize, required: usize },

    #[error("Landmark source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to decode frame on line {line}: {reason}")]
    Decode { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FaceMeshError {
    fn from(err: std::io::Error) -> Self {
        FaceMeshError::Io(err.to_string())
    }
}
