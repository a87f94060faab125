//! Wink to board action dispatch

use gesture::{UserEye, WinkEvent};
use serde::{Deserialize, Serialize};

use crate::board::Utterance;

/// What a wink asks the board to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardAction {
    /// Select the word under the gaze
    Select,
    /// Speak the selected words as a sentence
    Speak,
}

impl BoardAction {
    /// Fixed gesture binding: left wink selects, right wink speaks
    pub fn for_eye(eye: UserEye) -> Self {
        match eye {
            UserEye::Left => BoardAction::Select,
            UserEye::Right => BoardAction::Speak,
        }
    }

    pub fn for_wink(event: &WinkEvent) -> Self {
        Self::for_eye(event.eye)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardAction::Select => "select",
            BoardAction::Speak => "speak",
        }
    }
}

/// Result of a dispatched action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Selected { word: String },
    Spoke(Utterance),
}
