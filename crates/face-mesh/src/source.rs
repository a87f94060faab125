//! Landmark sources
//!
//! The landmark detector itself is external; a source only hands over what
//! the detector produced, one [`SourceFrame`] per captured video frame.

use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info};

use crate::{FaceMeshError, LandmarkFrame};

/// Detector output for one video frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFrame {
    /// Capture timestamp (milliseconds)
    pub timestamp_ms: u64,
    /// Landmarks of the detected face, `None` when no face was found
    #[serde(default)]
    pub face: Option<LandmarkFrame>,
}

impl SourceFrame {
    pub fn with_face(timestamp_ms: u64, face: LandmarkFrame) -> Self {
        Self {
            timestamp_ms,
            face: Some(face),
        }
    }

    pub fn without_face(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            face: None,
        }
    }
}

/// A producer of landmark frames
pub trait FrameSource {
    /// Next frame, or `Ok(None)` at end of stream
    fn next_frame(
        &mut self,
    ) -> impl Future<Output = Result<Option<SourceFrame>, FaceMeshError>> + Send;
}

/// Replays a recorded landmark stream, one JSON-encoded [`SourceFrame`] per line
pub struct JsonLinesSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl JsonLinesSource {
    /// Open a recording. A missing or unreadable file means the sensor is
    /// unavailable and the session cannot start.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FaceMeshError> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            FaceMeshError::SourceUnavailable(format!("{}: {}", path.display(), e))
        })?;

        info!("Replaying landmark frames from {}", path.display());

        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl FrameSource for JsonLinesSource {
    async fn next_frame(&mut self) -> Result<Option<SourceFrame>, FaceMeshError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let frame: SourceFrame =
                serde_json::from_str(line).map_err(|e| FaceMeshError::Decode {
                    line: self.line_no,
                    reason: e.to_string(),
                })?;
            return Ok(Some(frame));
        }

        debug!("Landmark recording exhausted after {} lines", self.line_no);
        Ok(None)
    }
}
