//! Word Board
//!
//! The application session behind the gaze interface:
//! - Four word slots, slot i shown in screen section i+1
//! - Left wink selects the word under the gaze and loads recommendations
//! - Right wink turns the selection into a spoken sentence
//! - Paging through alternative words

pub mod action;
pub mod board;
pub mod service;

pub use action::{ActionOutcome, BoardAction};
pub use board::{BoardSnapshot, Utterance, WordBoard, SLOT_COUNT};
pub use service::WordService;

use backend_client::BackendError;
use thiserror::Error;

/// Word board error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Section {0} is not on the board (expected 1-4)")]
    InvalidSection(u8),

    #[error("No word in section {0}")]
    EmptySlot(u8),

    #[error("No section under the gaze")]
    NoSection,

    #[error("No words selected")]
    NothingSelected,
}

impl BoardError {
    /// Message suitable for the status line shown to the user
    pub fn user_message(&self) -> String {
        match self {
            BoardError::Backend(e) => e.user_message(),
            BoardError::NothingSelected => "Select at least one word first.".to_string(),
            other => other.to_string(),
        }
    }
}
