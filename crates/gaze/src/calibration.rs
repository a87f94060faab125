//! Calibration sequence
//!
//! Twelve targets are shown one after another. Each target is sampled a
//! settle delay after it appears and replaced after the advance delay. A
//! sample is only taken from a frame received after its target appeared;
//! otherwise that slot stays empty. Samples are keyed by target index. After the last target the controller
//! switches to tracking regardless of how many samples were collected.

use face_mesh::{Landmark, LandmarkFrame};
use feature_engine::{EyeBounds, FeatureExtractor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GazeConfig;
use crate::state::{CalibrationProgress, TrackingMode};
use crate::timer::TimerQueue;
use crate::GazeError;

/// Calibration target, as fractions of the screen size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: f32,
    pub y: f32,
}

const fn target(x: f32, y: f32) -> CalibrationPoint {
    CalibrationPoint { x, y }
}

/// Targets in presentation order: three rows of four
pub const CALIBRATION_POINTS: [CalibrationPoint; 12] = [
    target(0.2, 0.15),
    target(0.4, 0.15),
    target(0.6, 0.15),
    target(0.8, 0.15),
    target(0.2, 0.5),
    target(0.4, 0.5),
    target(0.6, 0.5),
    target(0.8, 0.5),
    target(0.2, 0.85),
    target(0.4, 0.85),
    target(0.6, 0.85),
    target(0.8, 0.85),
];

/// Eye geometry captured while the user looked at a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub target: CalibrationPoint,
    pub left_iris: Landmark,
    pub right_iris: Landmark,
    pub left_bounds: EyeBounds,
    pub right_bounds: EyeBounds,
    /// Timestamp of the frame the sample was taken from
    pub captured_at_ms: u64,
}

/// Samples indexed by target. Recollecting a target overwrites its slot.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    slots: Vec<Option<CalibrationSample>>,
}

impl CalibrationStore {
    pub fn new(total: usize) -> Self {
        Self {
            slots: vec![None; total],
        }
    }

    /// Store a sample, returning the one it replaced
    pub fn record(
        &mut self,
        index: usize,
        sample: CalibrationSample,
    ) -> Result<Option<CalibrationSample>, GazeError> {
        let total = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(GazeError::CalibrationIndex { index, total })?;
        Ok(slot.replace(sample))
    }

    pub fn get(&self, index: usize) -> Option<&CalibrationSample> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of filled slots
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

/// Things that happened during a calibration tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalibrationEvent {
    TargetShown { index: usize, target: CalibrationPoint },
    SampleRecorded { index: usize },
    SampleMissed { index: usize },
    Completed { samples: usize, gaze_available: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Sample(usize),
    Advance(usize),
}

/// Most recent frame offered for sampling
#[derive(Debug, Clone, Copy)]
pub struct LatestFrame<'a> {
    pub timestamp_ms: u64,
    pub frame: &'a LandmarkFrame,
}

/// Calibration sequence controller
#[derive(Debug)]
pub struct CalibrationController {
    mode: TrackingMode,
    current_index: usize,
    target_shown_at: u64,
    store: CalibrationStore,
    timers: TimerQueue<Step>,
    extractor: FeatureExtractor,
    settle_delay_ms: u64,
    advance_delay_ms: u64,
    min_samples: usize,
}

impl CalibrationController {
    pub fn new(config: &GazeConfig) -> Self {
        Self {
            mode: TrackingMode::Idle,
            current_index: 0,
            target_shown_at: 0,
            store: CalibrationStore::new(CALIBRATION_POINTS.len()),
            timers: TimerQueue::new(),
            extractor: FeatureExtractor::new(),
            settle_delay_ms: config.settle_delay_ms,
            advance_delay_ms: config.advance_delay_ms,
            min_samples: config.min_calibration_samples,
        }
    }

    /// Begin (or restart) the sequence at the first target with an empty store
    pub fn start(&mut self, now_ms: u64) -> CalibrationEvent {
        self.timers.cancel_all();
        self.store.clear();
        self.mode = TrackingMode::Calibrating;
        self.current_index = 0;
        info!("Calibration started with {} targets", CALIBRATION_POINTS.len());
        self.show_target(now_ms)
    }

    fn show_target(&mut self, at_ms: u64) -> CalibrationEvent {
        let index = self.current_index;
        self.target_shown_at = at_ms;
        self.timers.schedule(at_ms + self.settle_delay_ms, Step::Sample(index));
        self.timers.schedule(at_ms + self.advance_delay_ms, Step::Advance(index));
        debug!("Showing calibration target {}/{}", index + 1, CALIBRATION_POINTS.len());

        CalibrationEvent::TargetShown {
            index,
            target: CALIBRATION_POINTS[index],
        }
    }

    /// Fire every step due at `now_ms`
    pub fn tick(&mut self, now_ms: u64, latest: Option<LatestFrame<'_>>) -> Vec<CalibrationEvent> {
        let mut events = Vec::new();

        while let Some((due_ms, step)) = self.timers.pop_due(now_ms) {
            match step {
                Step::Sample(index) => events.push(self.take_sample(index, latest)),
                Step::Advance(index) => {
                    self.current_index = index + 1;
                    if self.current_index < CALIBRATION_POINTS.len() {
                        events.push(self.show_target(due_ms));
                    } else {
                        events.push(self.finish());
                    }
                }
            }
        }

        events
    }

    fn take_sample(&mut self, index: usize, latest: Option<LatestFrame<'_>>) -> CalibrationEvent {
        let Some(latest) = latest.filter(|l| l.timestamp_ms >= self.target_shown_at) else {
            warn!("No frame since target {} appeared, sample skipped", index + 1);
            return CalibrationEvent::SampleMissed { index };
        };

        let features = self.extractor.extract(latest.frame);
        let sample = CalibrationSample {
            target: CALIBRATION_POINTS[index],
            left_iris: features.left.iris_center,
            right_iris: features.right.iris_center,
            left_bounds: features.left.bounds,
            right_bounds: features.right.bounds,
            captured_at_ms: latest.timestamp_ms,
        };

        match self.store.record(index, sample) {
            Ok(_) => {
                debug!("Calibration sample {} recorded", index + 1);
                CalibrationEvent::SampleRecorded { index }
            }
            Err(e) => {
                warn!("Calibration sample dropped: {}", e);
                CalibrationEvent::SampleMissed { index }
            }
        }
    }

    fn finish(&mut self) -> CalibrationEvent {
        self.mode = TrackingMode::Tracking;
        self.current_index = CALIBRATION_POINTS.len();
        let samples = self.store.count();
        let gaze_available = self.has_enough_samples();

        if gaze_available {
            info!("Calibration complete with {} samples", samples);
        } else {
            warn!(
                "Calibration finished with {} samples, {} needed for gaze",
                samples, self.min_samples
            );
        }

        CalibrationEvent::Completed {
            samples,
            gaze_available,
        }
    }

    /// Stop the sequence and drop all samples
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.store.clear();
        self.mode = TrackingMode::Idle;
        self.current_index = 0;
        self.target_shown_at = 0;
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            current_index: self.current_index,
            total: CALIBRATION_POINTS.len(),
        }
    }

    /// Target currently shown, while calibrating
    pub fn current_target(&self) -> Option<CalibrationPoint> {
        (self.mode == TrackingMode::Calibrating).then(|| CALIBRATION_POINTS[self.current_index])
    }

    pub fn sample_count(&self) -> usize {
        self.store.count()
    }

    pub fn has_enough_samples(&self) -> bool {
        self.store.count() >= self.min_samples
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_mesh::synthetic::FaceBuilder;

    const FRAME_MS: u64 = 50;

    fn controller() -> CalibrationController {
        CalibrationController::new(&GazeConfig::default())
    }

    /// Drive the controller with a frame every 50ms, skipping frames
    /// whose timestamps fall in `gaps`.
    fn run(
        ctrl: &mut CalibrationController,
        until_ms: u64,
        gaps: &[(u64, u64)],
    ) -> Vec<CalibrationEvent> {
        let frame = FaceBuilder::new().build();
        let mut latest_ts: Option<u64> = None;
        let mut events = Vec::new();

        let mut now = 0;
        while now <= until_ms {
            if !gaps.iter().any(|&(from, to)| now >= from && now < to) {
                latest_ts = Some(now);
            }
            let latest = latest_ts.map(|timestamp_ms| LatestFrame {
                timestamp_ms,
                frame: &frame,
            });
            events.extend(ctrl.tick(now, latest));
            now += FRAME_MS;
        }
        events
    }

    #[test]
    fn test_grid_layout() {
        assert_eq!(CALIBRATION_POINTS.len(), 12);
        assert_eq!(CALIBRATION_POINTS[0], target(0.2, 0.15));
        assert_eq!(CALIBRATION_POINTS[3], target(0.8, 0.15));
        assert_eq!(CALIBRATION_POINTS[11], target(0.8, 0.85));
    }

    #[test]
    fn test_full_sequence_auto_transitions_to_tracking() {
        let mut ctrl = controller();
        assert_eq!(ctrl.start(0), CalibrationEvent::TargetShown { index: 0, target: CALIBRATION_POINTS[0] });

        let events = run(&mut ctrl, 12 * 2500, &[]);

        let recorded = events
            .iter()
            .filter(|e| matches!(e, CalibrationEvent::SampleRecorded { .. }))
            .count();
        assert_eq!(recorded, 12);
        assert_eq!(
            events.last(),
            Some(&CalibrationEvent::Completed { samples: 12, gaze_available: true })
        );
        assert_eq!(ctrl.mode(), TrackingMode::Tracking);
        assert!(ctrl.current_target().is_none());
        assert_eq!(ctrl.progress(), CalibrationProgress { current_index: 12, total: 12 });
    }

    #[test]
    fn test_target_timing() {
        let mut ctrl = controller();
        ctrl.start(0);

        let events = run(&mut ctrl, 1950, &[]);
        assert!(events.is_empty());

        let events = ctrl.tick(2000, None);
        assert_eq!(events, vec![CalibrationEvent::SampleMissed { index: 0 }]);

        let events = ctrl.tick(2500, None);
        assert_eq!(
            events,
            vec![CalibrationEvent::TargetShown { index: 1, target: CALIBRATION_POINTS[1] }]
        );
        assert_eq!(ctrl.progress().current_index, 1);
    }

    #[test]
    fn test_stale_frame_is_not_sampled() {
        let mut ctrl = controller();
        ctrl.start(0);
        let frame = FaceBuilder::new().build();

        // Target 1 appears at 2500; the only frame predates it
        ctrl.tick(2500, Some(LatestFrame { timestamp_ms: 2400, frame: &frame }));
        let events = ctrl.tick(4500, Some(LatestFrame { timestamp_ms: 2400, frame: &frame }));

        assert!(events.contains(&CalibrationEvent::SampleMissed { index: 1 }));
        assert!(ctrl.store().get(1).is_none());
    }

    #[test]
    fn test_insufficient_samples_still_tracks() {
        let mut ctrl = controller();
        ctrl.start(0);

        // No frames while targets 0-3 are sampled (samples at 2000..9500)
        let events = run(&mut ctrl, 12 * 2500, &[(0, 10_000)]);

        assert_eq!(ctrl.sample_count(), 8);
        assert!(!ctrl.has_enough_samples());
        assert_eq!(ctrl.mode(), TrackingMode::Tracking);
        assert_eq!(
            events.last(),
            Some(&CalibrationEvent::Completed { samples: 8, gaze_available: false })
        );
    }

    #[test]
    fn test_restart_discards_previous_samples() {
        let mut ctrl = controller();
        ctrl.start(0);
        run(&mut ctrl, 12 * 2500, &[]);
        assert_eq!(ctrl.sample_count(), 12);

        ctrl.start(40_000);
        assert_eq!(ctrl.sample_count(), 0);
        assert_eq!(ctrl.mode(), TrackingMode::Calibrating);

        let frame = FaceBuilder::new().build();
        ctrl.tick(42_000, Some(LatestFrame { timestamp_ms: 41_990, frame: &frame }));

        assert_eq!(ctrl.sample_count(), 1);
        assert_eq!(ctrl.store().get(0).map(|s| s.captured_at_ms), Some(41_990));
    }

    #[test]
    fn test_reset_cancels_pending_steps() {
        let mut ctrl = controller();
        ctrl.start(0);
        ctrl.reset();

        assert_eq!(ctrl.mode(), TrackingMode::Idle);
        assert!(ctrl.tick(100_000, None).is_empty());
        assert_eq!(ctrl.sample_count(), 0);
    }

    #[test]
    fn test_store_rejects_out_of_range() {
        let mut store = CalibrationStore::new(2);
        let sample = CalibrationSample {
            target: CALIBRATION_POINTS[0],
            left_iris: Landmark::new(0.4, 0.4),
            right_iris: Landmark::new(0.6, 0.4),
            left_bounds: EyeBounds { center_x: 0.4, width: 0.08 },
            right_bounds: EyeBounds { center_x: 0.6, width: 0.08 },
            captured_at_ms: 0,
        };

        assert_eq!(store.record(0, sample), Ok(None));
        assert_eq!(store.record(0, sample), Ok(Some(sample)));
        assert_eq!(
            store.record(5, sample),
            Err(GazeError::CalibrationIndex { index: 5, total: 2 })
        );
        assert_eq!(store.count(), 1);
    }
}
