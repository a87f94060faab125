//! Per-frame gaze tracking pipeline

use face_mesh::{LandmarkFrame, SourceFrame};
use feature_engine::{DetectedEye, FaceFeatures, FeatureExtractor};
use gesture::{classify, user_eye, EyeOpenness, UserEye, WinkDetector, WinkEvent};
use tracing::{debug, info};

use crate::calibration::{CalibrationController, CalibrationEvent, LatestFrame};
use crate::config::GazeConfig;
use crate::filter::GazeFilter;
use crate::mapper::{GazeMapper, GazePoint};
use crate::state::{EyeStatus, TrackerState, TrackingMode};
use crate::GazeError;

const READY_STATUS: &str = "Ready - start calibration";

/// Result of processing one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub face_detected: bool,
    /// Smoothed gaze point, when tracking with enough samples
    pub gaze: Option<GazePoint>,
    /// Section under the smoothed gaze
    pub section: Option<u8>,
    /// Wink fired by this frame (never while calibrating)
    pub wink: Option<WinkEvent>,
    /// Calibration steps that came due at this frame's timestamp
    pub calibration: Vec<CalibrationEvent>,
}

/// Gaze tracker
pub struct GazeTracker {
    config: GazeConfig,
    extractor: FeatureExtractor,
    calibration: CalibrationController,
    mapper: GazeMapper,
    filter: GazeFilter,
    winks: WinkDetector,
    /// Only the most recent face is kept, for calibration sampling
    latest: Option<(u64, LandmarkFrame)>,
    state: TrackerState,
}

impl GazeTracker {
    /// Create a new tracker with configuration
    pub fn new(config: GazeConfig) -> Result<Self, GazeError> {
        config.validate()?;
        info!(
            "Gaze tracker created for {}x{} screen",
            config.screen.width, config.screen.height
        );

        let mut tracker = Self {
            extractor: FeatureExtractor::new(),
            calibration: CalibrationController::new(&config),
            mapper: GazeMapper::new(&config),
            filter: GazeFilter::new(&config),
            winks: WinkDetector::new(config.wink.clone()),
            latest: None,
            state: TrackerState::default(),
            config,
        };
        tracker.reset();
        Ok(tracker)
    }

    /// Process one frame from the landmark source
    pub fn on_frame(&mut self, frame: SourceFrame) -> FrameOutcome {
        let now_ms = frame.timestamp_ms;
        self.state.last_frame_ms = Some(now_ms);

        let Some(face) = frame.face else {
            debug!("No face in frame at {}ms", now_ms);
            self.state.face_detected = false;
            self.state.left_eye = None;
            self.state.right_eye = None;
            self.state.head_pose = None;

            return FrameOutcome {
                calibration: self.tick(now_ms),
                ..Default::default()
            };
        };

        let features = self.extractor.extract(&face);
        self.latest = Some((now_ms, face));
        let calibration = self.tick(now_ms);

        self.state.face_detected = true;
        self.state.head_pose = Some(features.head_pose);
        self.update_eyes(&features);

        // Closures during calibration neither fire nor start a cooldown
        let wink = if self.calibration.mode() == TrackingMode::Calibrating {
            None
        } else {
            self.winks.update(&features, now_ms)
        };

        let (gaze, section) = self.update_gaze(&features);

        FrameOutcome {
            face_detected: true,
            gaze,
            section,
            wink,
            calibration,
        }
    }

    fn update_gaze(&mut self, features: &FaceFeatures) -> (Option<GazePoint>, Option<u8>) {
        if self.calibration.mode() != TrackingMode::Tracking {
            return (None, None);
        }

        let Some(raw) = self.mapper.map(features, self.calibration.sample_count()) else {
            return (None, None);
        };

        let smoothed = self.filter.push(raw);
        let section = self.filter.section();
        self.state.gaze_point = Some(smoothed);
        self.state.current_section = section;

        (Some(smoothed), section)
    }

    fn update_eyes(&mut self, features: &FaceFeatures) {
        let threshold = self.config.wink.open_threshold;

        for detected in [DetectedEye::Left, DetectedEye::Right] {
            let ratio = features.eye(detected).open_ratio;
            let status = EyeStatus {
                open: classify(ratio, threshold) == EyeOpenness::Open,
                ratio,
            };
            match user_eye(detected) {
                UserEye::Left => self.state.left_eye = Some(status),
                UserEye::Right => self.state.right_eye = Some(status),
            }
        }
    }

    /// Advance calibration to `now_ms` without a new frame
    pub fn tick(&mut self, now_ms: u64) -> Vec<CalibrationEvent> {
        let latest = self.latest.as_ref().map(|(timestamp_ms, frame)| LatestFrame {
            timestamp_ms: *timestamp_ms,
            frame,
        });
        let events = self.calibration.tick(now_ms, latest);
        self.apply_calibration_events(&events);
        events
    }

    /// Start (or restart) calibration at `now_ms`
    pub fn start_calibration(&mut self, now_ms: u64) -> CalibrationEvent {
        self.filter.reset();
        self.winks.reset();
        self.state.gaze_point = None;
        self.state.current_section = None;

        let event = self.calibration.start(now_ms);
        self.apply_calibration_events(&[event]);
        event
    }

    fn apply_calibration_events(&mut self, events: &[CalibrationEvent]) {
        for event in events {
            match *event {
                CalibrationEvent::TargetShown { index, .. } => {
                    self.state.status =
                        format!("Calibrating {}/{}", index + 1, self.calibration.progress().total);
                }
                CalibrationEvent::Completed {
                    samples,
                    gaze_available,
                } => {
                    self.state.status = if gaze_available {
                        "Tracking".to_string()
                    } else {
                        format!(
                            "Calibration incomplete: {} of {} samples, recalibrate",
                            samples,
                            self.calibration.min_samples()
                        )
                    };
                }
                CalibrationEvent::SampleRecorded { .. } | CalibrationEvent::SampleMissed { .. } => {}
            }
        }

        self.state.mode = self.calibration.mode();
        self.state.calibration = self.calibration.progress();
        self.state.samples_collected = self.calibration.sample_count();
        self.state.gaze_available =
            self.state.mode == TrackingMode::Tracking && self.calibration.has_enough_samples();
    }

    /// Return to idle: cancel calibration, drop samples, history, and the last frame
    pub fn reset(&mut self) {
        self.calibration.reset();
        self.filter.reset();
        self.winks.reset();
        self.latest = None;
        self.state = TrackerState {
            status: READY_STATUS.to_string(),
            calibration: self.calibration.progress(),
            ..Default::default()
        };
        info!("Gaze tracker reset");
    }

    /// Current observable state
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn mode(&self) -> TrackingMode {
        self.calibration.mode()
    }

    pub fn calibration(&self) -> &CalibrationController {
        &self.calibration
    }

    pub fn config(&self) -> &GazeConfig {
        &self.config
    }
}
