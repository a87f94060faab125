//! Gaze Assist API Server
//!
//! HTTP surface over the gaze tracker and the word board. The landmark
//! detector pushes frames; a background task advances calibration; winks
//! are dispatched to the board without blocking frame processing.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use backend_client::BackendClient;
use face_mesh::{FaceMeshError, FrameSource, JsonLinesSource, SourceFrame};
use gaze::{CalibrationEvent, FrameOutcome, GazeConfig, GazeError, GazeTracker, TrackerState};
use gesture::WinkEvent;
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use word_board::{ActionOutcome, BoardAction, BoardSnapshot, WordBoard};

pub mod error;
mod routes;
pub mod settings;

pub use error::ApiError;
pub use settings::Settings;

/// Milliseconds since server start; the single time base of the tracker
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub(crate) tracker: Mutex<GazeTracker>,
    pub(crate) board: Arc<Mutex<WordBoard<BackendClient>>>,
    board_tx: watch::Sender<BoardSnapshot>,
    /// Audio of the most recent utterance
    pub(crate) last_audio: RwLock<Option<Vec<u8>>>,
    pub(crate) metrics: Option<PrometheusHandle>,
    pub(crate) clock: Clock,
    /// Version string
    pub version: String,
}

impl AppState {
    /// Create new application state
    pub fn new(
        gaze: GazeConfig,
        backend: BackendClient,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, GazeError> {
        let board = WordBoard::new(backend);
        let (board_tx, _) = watch::channel(board.snapshot());

        Ok(Self {
            tracker: Mutex::new(GazeTracker::new(gaze)?),
            board: Arc::new(Mutex::new(board)),
            board_tx,
            last_audio: RwLock::new(None),
            metrics,
            clock: Clock::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Fill the board with the initial words; failures only update its status
    pub async fn load_initial_words(&self) {
        let mut board = self.board.lock().await;
        if let Err(e) = board.load_initial().await {
            warn!("Could not load initial words: {}", e);
        }
        self.publish(&board);
    }

    /// Run one frame through the tracker and dispatch any wink
    pub async fn process_frame(self: &Arc<Self>, frame: SourceFrame) -> FrameOutcome {
        let (outcome, section) = {
            let mut tracker = self.tracker.lock().await;
            let outcome = tracker.on_frame(frame);
            let section = tracker.state().current_section;
            gauge!("calibration_samples").set(tracker.state().samples_collected as f64);
            (outcome, section)
        };

        counter!("frames_processed_total").increment(1);
        if !outcome.face_detected {
            counter!("frames_without_face_total").increment(1);
        }
        log_calibration_events(&outcome.calibration);

        if let Some(wink) = outcome.wink {
            self.dispatch_wink(wink, section);
        }

        outcome
    }

    /// Start the board action bound to a wink in the background.
    ///
    /// Winks arriving while a board request is in flight are dropped.
    pub fn dispatch_wink(self: &Arc<Self>, wink: WinkEvent, section: Option<u8>) {
        let action = BoardAction::for_wink(&wink);
        counter!("wink_events_total", "eye" => wink.eye.as_str()).increment(1);

        let Ok(mut board) = self.board.clone().try_lock_owned() else {
            info!("Board busy, ignoring {} wink", wink.eye.as_str());
            return;
        };

        self.mark_busy();
        let state = Arc::clone(self);

        tokio::spawn(async move {
            let result = board.dispatch(action, section).await;
            let label = if result.is_ok() { "ok" } else { "error" };
            counter!("board_actions_total", "action" => action.as_str(), "result" => label)
                .increment(1);

            match result {
                Ok(ActionOutcome::Selected { word }) => info!("Wink selected '{}'", word),
                Ok(ActionOutcome::Spoke(utterance)) => {
                    info!("Spoke: {}", utterance.sentence);
                    *state.last_audio.write().await = utterance.audio;
                }
                Err(e) => warn!("{} action failed: {}", action.as_str(), e),
            }
            state.publish(&board);
        });
    }

    /// Flag the published board as waiting on the backend
    pub(crate) fn mark_busy(&self) {
        self.board_tx.send_modify(|snapshot| snapshot.busy = true);
    }

    /// Publish the board's current state to observers
    pub(crate) fn publish(&self, board: &WordBoard<BackendClient>) {
        self.board_tx.send_replace(board.snapshot());
    }

    /// Latest published board state
    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.board_tx.borrow().clone()
    }

    /// Receiver notified on every board change
    pub fn board_updates(&self) -> watch::Receiver<BoardSnapshot> {
        self.board_tx.subscribe()
    }

    pub async fn tracker_state(&self) -> TrackerState {
        self.tracker.lock().await.state().clone()
    }

    /// Advance calibration to the current time
    pub async fn tick(&self) -> Vec<CalibrationEvent> {
        let now_ms = self.clock.now_ms();
        let events = self.tracker.lock().await.tick(now_ms);
        log_calibration_events(&events);
        events
    }
}

fn log_calibration_events(events: &[CalibrationEvent]) {
    for event in events {
        match event {
            CalibrationEvent::Completed {
                samples,
                gaze_available,
            } => {
                info!(
                    "Calibration finished with {} samples (gaze available: {})",
                    samples, gaze_available
                );
                gauge!("calibration_samples").set(*samples as f64);
            }
            other => debug!("Calibration event: {:?}", other),
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::tracker::health))
        .route("/api/v1/state", get(routes::tracker::get_state))
        .route("/api/v1/frames", post(routes::tracker::ingest_frame))
        .route("/api/v1/calibration/start", post(routes::tracker::start_calibration))
        .route("/api/v1/reset", post(routes::tracker::reset))
        .route("/api/v1/words/next-page", post(routes::words::next_page))
        .route("/api/v1/words/prev-page", post(routes::words::prev_page))
        .route("/api/v1/speech/latest", get(routes::words::latest_speech))
        .route("/metrics", get(routes::metrics::render))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Advance calibration every `interval_ms` so targets move without new frames
pub fn spawn_ticker(state: Arc<AppState>, interval_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            state.tick().await;
        }
    })
}

/// Feed a frame source through the tracker until it ends.
///
/// Frames are restamped with the server clock; with `realtime` the gaps
/// between recorded timestamps are reproduced.
pub async fn replay<S: FrameSource>(
    state: Arc<AppState>,
    mut source: S,
    realtime: bool,
) -> Result<usize, FaceMeshError> {
    let mut previous_ms: Option<u64> = None;
    let mut count = 0;

    while let Some(frame) = source.next_frame().await? {
        if let (true, Some(previous)) = (realtime, previous_ms) {
            let gap = frame.timestamp_ms.saturating_sub(previous);
            tokio::time::sleep(Duration::from_millis(gap)).await;
        }
        previous_ms = Some(frame.timestamp_ms);

        let stamped = SourceFrame {
            timestamp_ms: state.clock.now_ms(),
            face: frame.face,
        };
        state.process_frame(stamped).await;
        count += 1;
    }

    info!("Replay finished after {} frames", count);
    Ok(count)
}

static METRICS: StdMutex<Option<PrometheusHandle>> = StdMutex::new(None);

/// Install the Prometheus recorder once per process and return its handle
pub fn install_metrics() -> Result<PrometheusHandle, ApiError> {
    let mut installed = METRICS
        .lock()
        .map_err(|_| ApiError::Metrics("recorder lock poisoned".into()))?;

    if let Some(handle) = installed.as_ref() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Metrics(e.to_string()))?;
    *installed = Some(handle.clone());
    Ok(handle)
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let level = level
        .parse::<Level>()
        .with_context(|| format!("invalid log level '{}'", level))?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let metrics = install_metrics()?;
    let backend = BackendClient::new(settings.backend.clone())?;
    let state = Arc::new(AppState::new(settings.gaze.clone(), backend, Some(metrics))?);

    // A missing recording means the sensor is unavailable; fail before serving
    let source = match &settings.replay_file {
        Some(path) => Some(JsonLinesSource::open(path).await?),
        None => None,
    };

    {
        let state = Arc::clone(&state);
        tokio::spawn(async move { state.load_initial_words().await });
    }
    spawn_ticker(Arc::clone(&state), settings.tick_interval_ms);

    if let Some(source) = source {
        let state = Arc::clone(&state);
        let realtime = settings.replay_realtime;
        tokio::spawn(async move {
            if let Err(e) = replay(state, source, realtime).await {
                warn!("Replay stopped: {}", e);
            }
        });
    }

    let app = create_router(state);

    info!("Starting API server on {}", settings.listen_addr);

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use axum::Json;
    use backend_client::BackendConfig;
    use face_mesh::synthetic::FaceBuilder;
    use gaze::TrackingMode;
    use gesture::UserEye;
    use serde_json::{json, Value};

    const INITIAL: [&str; 4] = ["hello", "water", "help", "yes"];

    /// Language backend stand-in
    fn fake_backend() -> Router {
        Router::new()
            .route(
                "/api/initial-words",
                get(|| async { Json(json!({ "words": INITIAL })) }),
            )
            .route(
                "/api/recommend",
                post(|| async { Json(json!({ "recommendations": ["please", "now", "more", "later"] })) }),
            )
            .route(
                "/api/recommend-diverse",
                post(|Json(body): Json<Value>| async move {
                    let offset = body["exclude_words"].as_array().map_or(0, Vec::len);
                    let words: Vec<String> = (offset..offset + 4).map(|i| format!("alt{}", i)).collect();
                    Json(json!({ "recommendations": words }))
                }),
            )
            .route(
                "/api/generate",
                post(|Json(body): Json<Value>| async move {
                    let words: Vec<&str> = body["words"]
                        .as_array()
                        .map(|w| w.iter().filter_map(Value::as_str).collect())
                        .unwrap_or_default();
                    Json(json!({ "sentence": words.join(" ") }))
                }),
            )
            .route("/api/tts", post(|| async { b"ID3fake".to_vec() }))
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn state_for(base_url: String, metrics: Option<PrometheusHandle>) -> Arc<AppState> {
        let backend = BackendClient::new(BackendConfig {
            base_url,
            retry_delay_ms: 10,
            ..Default::default()
        })
        .unwrap();
        Arc::new(AppState::new(GazeConfig::default(), backend, metrics).unwrap())
    }

    /// Fake backend plus the API server; returns the state and the API base URL
    async fn start() -> (Arc<AppState>, String) {
        let backend_url = serve(fake_backend()).await;
        let state = state_for(backend_url, None);
        let api_url = serve(create_router(Arc::clone(&state))).await;
        (state, api_url)
    }

    async fn wait_for_board(
        state: &AppState,
        done: impl FnMut(&BoardSnapshot) -> bool,
    ) -> BoardSnapshot {
        let mut updates = state.board_updates();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(done))
            .await
            .unwrap()
            .unwrap()
            .clone();
        snapshot
    }

    fn wink(eye: UserEye, timestamp_ms: u64) -> WinkEvent {
        WinkEvent {
            eye,
            timestamp_ms,
            closed_ms: 500,
        }
    }

    /// Feed the same face every 50ms over [from, to]
    async fn feed(state: &Arc<AppState>, face: &FaceBuilder, from: u64, to: u64) {
        let frame = face.build();
        for ts in (from..=to).step_by(50) {
            state
                .process_frame(SourceFrame::with_face(ts, frame.clone()))
                .await;
        }
    }

    #[test]
    fn test_invalid_log_level_is_error() {
        let err = init_logging("loud", false).unwrap_err();
        assert!(err.to_string().contains("invalid log level 'loud'"));
    }

    #[tokio::test]
    async fn test_health() {
        let (_, url) = start().await;
        let body: Value = reqwest::get(format!("{}/api/v1/health", url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_frame_ingest() {
        let (state, url) = start().await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{}/api/v1/frames", url))
            .json(&json!({ "face": null }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["face_detected"], false);

        let body: Value = client
            .post(format!("{}/api/v1/frames", url))
            .json(&json!({ "face": FaceBuilder::new().build() }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["face_detected"], true);
        assert!(body["gaze"].is_null());

        let tracker = state.tracker_state().await;
        assert!(tracker.face_detected);
        assert!(tracker.left_eye.is_some());
    }

    #[tokio::test]
    async fn test_frame_with_too_few_landmarks_is_rejected() {
        let (_, url) = start().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/v1/frames", url))
            .json(&json!({ "face": [{ "x": 0.5, "y": 0.5 }] }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_calibration_start_and_reset() {
        let (_, url) = start().await;
        let client = reqwest::Client::new();

        let event: Value = client
            .post(format!("{}/api/v1/calibration/start", url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(event["type"], "target_shown");
        assert_eq!(event["index"], 0);

        let body: Value = reqwest::get(format!("{}/api/v1/state", url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["tracker"]["mode"], "calibrating");
        assert_eq!(body["tracker"]["status"], "Calibrating 1/12");
        assert!((body["calibration_target"]["x"].as_f64().unwrap() - 0.2).abs() < 1e-6);

        let body: Value = client
            .post(format!("{}/api/v1/reset", url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["mode"], "idle");
        assert!(body["current_section"].is_null());
    }

    #[tokio::test]
    async fn test_paging() {
        let (state, url) = start().await;
        state.load_initial_words().await;
        let client = reqwest::Client::new();

        let page: BoardSnapshot = client
            .post(format!("{}/api/v1/words/next-page", url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page.words, ["alt4", "alt5", "alt6", "alt7"]);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.prev_page_words.as_deref(), Some(&INITIAL.map(String::from)[..]));
        assert!(!page.busy);

        let page: BoardSnapshot = client
            .post(format!("{}/api/v1/words/prev-page", url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page.words, INITIAL);
        assert_eq!(page.current_page, 1);

        // Forward again reuses the fetched page
        let page: BoardSnapshot = client
            .post(format!("{}/api/v1/words/next-page", url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page.words, ["alt4", "alt5", "alt6", "alt7"]);
        assert_eq!(page.total_pages, 2);
        assert_eq!(state.board_snapshot(), page);
    }

    #[tokio::test]
    async fn test_busy_board() {
        let (state, url) = start().await;
        state.load_initial_words().await;
        let guard = state.board.lock().await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/v1/words/next-page", url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // A wink during a request is dropped
        state.dispatch_wink(wink(UserEye::Left, 1000), Some(1));
        assert!(!state.board_snapshot().busy);
        drop(guard);

        assert!(state.board_snapshot().selected_words.is_empty());
    }

    #[tokio::test]
    async fn test_select_then_speak() {
        let (state, url) = start().await;
        state.load_initial_words().await;

        state.dispatch_wink(wink(UserEye::Left, 1000), Some(2));
        let board = wait_for_board(&state, |b| !b.busy && !b.selected_words.is_empty()).await;
        assert_eq!(board.selected_words, ["water"]);
        assert_eq!(board.words, ["please", "now", "more", "later"]);

        state.dispatch_wink(wink(UserEye::Right, 3000), None);
        let board = wait_for_board(&state, |b| !b.busy && b.last_sentence.is_some()).await;
        assert_eq!(board.last_sentence.as_deref(), Some("water"));
        assert!(board.selected_words.is_empty());
        assert_eq!(board.words, INITIAL);

        let response = reqwest::get(format!("{}/api/v1/speech/latest", url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "audio/mpeg");
        assert_eq!(&response.bytes().await.unwrap()[..], b"ID3fake");
    }

    #[tokio::test]
    async fn test_speak_without_selection() {
        let (state, url) = start().await;
        state.load_initial_words().await;

        state.dispatch_wink(wink(UserEye::Right, 1000), None);
        let board = wait_for_board(&state, |b| !b.busy && b.status.starts_with("Select")).await;
        assert_eq!(board.status, "Select at least one word first.");

        let response = reqwest::get(format!("{}/api/v1/speech/latest", url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wink_selects_word_under_gaze() {
        let (state, _) = start().await;
        state.load_initial_words().await;

        state.tracker.lock().await.start_calibration(0);
        feed(&state, &FaceBuilder::new(), 0, 30_000).await;
        assert_eq!(state.tracker_state().await.mode, TrackingMode::Tracking);

        // Looking toward larger image x puts the gaze in the leftmost section
        let looking = FaceBuilder::new().iris_offset(0.05);
        feed(&state, &looking, 30_050, 40_000).await;
        assert_eq!(state.tracker_state().await.current_section, Some(1));

        // Detector-right eye closed is the user's left wink
        feed(&state, &looking.clone().right_open_ratio(0.05), 40_050, 40_650).await;

        let board = wait_for_board(&state, |b| !b.busy && !b.selected_words.is_empty()).await;
        assert_eq!(board.selected_words, ["hello"]);
    }

    #[tokio::test]
    async fn test_winks_ignored_while_calibrating() {
        let (state, _) = start().await;
        state.load_initial_words().await;

        state.tracker.lock().await.start_calibration(0);
        feed(&state, &FaceBuilder::new().right_open_ratio(0.05), 0, 1500).await;

        assert!(!state.board_snapshot().busy);
        assert!(state.board_snapshot().selected_words.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_advances_calibration_without_frames() {
        let state = state_for("http://127.0.0.1:9".to_string(), None);
        let now_ms = state.clock.now_ms();
        state.tracker.lock().await.start_calibration(now_ms);
        let ticker = spawn_ticker(Arc::clone(&state), 50);

        tokio::time::sleep(Duration::from_millis(2600)).await;
        let tracker = state.tracker_state().await;
        assert_eq!(tracker.calibration.current_index, 1);
        assert_eq!(tracker.samples_collected, 0);

        ticker.abort();
    }

    #[tokio::test]
    async fn test_replay_restamps_frames() {
        let path = std::env::temp_dir().join(format!("gaze-assist-replay-{}.jsonl", std::process::id()));
        let face = FaceBuilder::new().build();
        let lines: Vec<String> = [
            SourceFrame::with_face(1_000_000, face.clone()),
            SourceFrame::without_face(1_000_033),
            SourceFrame::with_face(1_000_066, face),
        ]
        .iter()
        .map(|frame| serde_json::to_string(frame).unwrap())
        .collect();
        std::fs::write(&path, lines.join("\n")).unwrap();

        let state = state_for("http://127.0.0.1:9".to_string(), None);
        let source = JsonLinesSource::open(&path).await.unwrap();
        let count = replay(Arc::clone(&state), source, false).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(count, 3);
        let tracker = state.tracker_state().await;
        assert!(tracker.face_detected);
        assert!(tracker.last_frame_ms.unwrap() < 1_000_000);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (_, url) = start().await;
        let response = reqwest::get(format!("{}/metrics", url)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let handle = install_metrics().unwrap();
        let backend_url = serve(fake_backend()).await;
        let state = state_for(backend_url, Some(handle));
        let url = serve(create_router(Arc::clone(&state))).await;

        state.process_frame(SourceFrame::without_face(0)).await;

        let body = reqwest::get(format!("{}/metrics", url))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("frames_processed_total"));
        assert!(body.contains("frames_without_face_total"));
    }
}
