//! Server settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `gaze-assist.toml` in the working directory, then `GAZE_ASSIST__*`
//! environment variables (`__` separates nested keys, e.g.
//! `GAZE_ASSIST__GAZE__SCREEN__WIDTH=1280`).

use std::path::{Path, PathBuf};

use backend_client::BackendConfig;
use config::{Config, ConfigError, Environment, File};
use gaze::GazeConfig;
use serde::{Deserialize, Serialize};

/// Settings file looked up when no explicit path is given
pub const DEFAULT_SETTINGS_FILE: &str = "gaze-assist";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "GAZE_ASSIST";

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the HTTP server binds to
    pub listen_addr: String,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Interval of the calibration tick task (milliseconds)
    pub tick_interval_ms: u64,
    /// Recorded landmark stream to replay instead of waiting for pushed frames
    pub replay_file: Option<PathBuf>,
    /// Pace replayed frames by their recorded timestamps
    pub replay_realtime: bool,
    pub gaze: GazeConfig,
    pub backend: BackendConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            tick_interval_ms: 50,
            replay_file: None,
            replay_realtime: true,
            gaze: GazeConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl Settings {
    /// Load from `gaze-assist.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(DEFAULT_SETTINGS_FILE).required(false))
    }

    /// Load from an explicit settings file and the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path))
    }

    fn build(file: File<config::FileSourceFile, config::FileFormat>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tick_interval_ms, 50);
        assert_eq!(settings.gaze.min_calibration_samples, 9);
        assert_eq!(settings.backend.max_retries, 2);
        assert!(settings.replay_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("gaze-assist-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
listen_addr = "127.0.0.1:9000"
replay_file = "session.jsonl"

[gaze.screen]
width = 1200.0
height = 800.0

[backend]
base_url = "http://backend:8000"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.listen_addr, "127.0.0.1:9000");
        assert_eq!(settings.replay_file, Some(PathBuf::from("session.jsonl")));
        assert_eq!(settings.gaze.screen.width, 1200.0);
        assert_eq!(settings.gaze.sensitivity, 6.0);
        assert_eq!(settings.backend.base_url, "http://backend:8000");
        assert_eq!(settings.backend.timeout_ms, 30_000);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Settings::load_from(Path::new("/nonexistent/gaze-assist.toml")).is_err());
    }
}
