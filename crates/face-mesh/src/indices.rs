//! Anatomical landmark index sets of the refined face mesh
//!
//! "Left"/"right" are the detector's naming, i.e. image space. With a
//! mirrored selfie camera the detector's right eye is the user's left eye;
//! the mapping to user-semantic eyes lives in the gesture crate.

/// Detector-left eye contour (16 points)
pub const LEFT_EYE: [usize; 16] = [
    33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246,
];

/// Detector-right eye contour (16 points)
pub const RIGHT_EYE: [usize; 16] = [
    362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398,
];

/// Detector-left iris (center + 4 rim points)
pub const LEFT_IRIS: [usize; 5] = [468, 469, 470, 471, 472];

/// Detector-right iris (center + 4 rim points)
pub const RIGHT_IRIS: [usize; 5] = [473, 474, 475, 476, 477];

/// Nose tip
pub const NOSE_TIP: usize = 1;

/// Outer corner of the detector-left eye
pub const LEFT_EYE_OUTER: usize = 33;

/// Outer corner of the detector-right eye
pub const RIGHT_EYE_OUTER: usize = 263;

/// Chin
pub const CHIN: usize = 175;
