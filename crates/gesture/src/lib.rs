//! Wink Gesture Detection
//!
//! Turns per-frame eye open/closed classification into discrete wink
//! events, suppressing blinks, single-frame noise, and repeats.

mod eye;
mod wink;

pub use eye::{user_eye, UserEye};
pub use wink::{classify, EyeOpenness, EyeWinkState, WinkConfig, WinkDetector, WinkEvent};
