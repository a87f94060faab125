//! Gaze smoothing and screen sections
//!
//! Two stages: a recency-weighted average over the last N raw points, then
//! an exponential blend of the previous output toward that average.

use ring_buffer::RingBuffer;

use crate::config::GazeConfig;
use crate::mapper::GazePoint;

/// Number of vertical screen sections
pub const SECTION_COUNT: u8 = 4;

/// Section 1-4 of a horizontal coordinate, left to right.
///
/// Boundaries belong to the section on their right. Coordinates past
/// either edge fall into the outermost sections.
pub fn screen_section(x: f32, width: f32) -> u8 {
    let section_width = width / SECTION_COUNT as f32;
    if x < section_width {
        1
    } else if x < section_width * 2.0 {
        2
    } else if x < section_width * 3.0 {
        3
    } else {
        4
    }
}

/// Two-stage gaze smoother
#[derive(Debug, Clone)]
pub struct GazeFilter {
    history: RingBuffer<GazePoint>,
    smoothed: Option<GazePoint>,
    smoothing_factor: f32,
    screen_width: f32,
}

impl GazeFilter {
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            history: RingBuffer::new(config.history_capacity),
            smoothed: None,
            smoothing_factor: config.smoothing_factor,
            screen_width: config.screen.width,
        }
    }

    /// Add a raw point and return the new smoothed point
    pub fn push(&mut self, raw: GazePoint) -> GazePoint {
        self.history.push(raw);
        let target = self.weighted_average();

        let next = match self.smoothed {
            // First output equals the target
            None => target,
            Some(prev) => GazePoint {
                x: prev.x + (target.x - prev.x) * self.smoothing_factor,
                y: prev.y + (target.y - prev.y) * self.smoothing_factor,
            },
        };

        self.smoothed = Some(next);
        next
    }

    /// Linear recency weights: oldest weight 1, newest weight n
    fn weighted_average(&self) -> GazePoint {
        let (sum_x, sum_y, total) = self.history.iter().enumerate().fold(
            (0.0f32, 0.0f32, 0.0f32),
            |(sx, sy, total), (i, p)| {
                let w = (i + 1) as f32;
                (sx + p.x * w, sy + p.y * w, total + w)
            },
        );

        GazePoint {
            x: sum_x / total,
            y: sum_y / total,
        }
    }

    /// Latest smoothed point
    pub fn current(&self) -> Option<GazePoint> {
        self.smoothed
    }

    /// Section under the latest smoothed point
    pub fn section(&self) -> Option<u8> {
        self.smoothed.map(|p| screen_section(p.x, self.screen_width))
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.smoothed = None;
    }
}
