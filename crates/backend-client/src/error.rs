//! Backend Error Types

use thiserror::Error;

use crate::types::Endpoint;

/// Errors that can occur talking to the backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Connection refused or host unreachable
    #[error("Backend unreachable: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("Backend request timed out after {0}ms")]
    Timeout(u64),

    /// Word recommendation failed on the server
    #[error("Word recommendation failed: {0}")]
    Recommendation(String),

    /// Sentence generation failed or its model server is down
    #[error("Sentence generation failed: {0}")]
    Generation(String),

    /// Speech synthesis failed on the server
    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    /// Any other server-side failure
    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },

    /// The server rejected the request (4xx)
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Client could not be constructed
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// Classify a non-success HTTP status.
    ///
    /// 500s are attributed to a service by the detail text first, then by
    /// the endpoint that failed. A 503 always means the generation model
    /// server is down.
    pub fn from_status(endpoint: Endpoint, status: u16, detail: String) -> Self {
        match status {
            400..=499 => BackendError::Rejected { status, detail },
            503 => BackendError::Generation(detail),
            500 => {
                if detail.contains("FAISS") || detail.contains("recommend") {
                    BackendError::Recommendation(detail)
                } else if detail.contains("Ollama") || detail.contains("generate") {
                    BackendError::Generation(detail)
                } else if detail.contains("TTS") || detail.contains("audio") {
                    BackendError::Speech(detail)
                } else {
                    match endpoint {
                        Endpoint::Recommend | Endpoint::RecommendDiverse => {
                            BackendError::Recommendation(detail)
                        }
                        Endpoint::Generate => BackendError::Generation(detail),
                        Endpoint::Tts => BackendError::Speech(detail),
                        Endpoint::InitialWords => BackendError::Server { status, detail },
                    }
                }
            }
            _ => BackendError::Server { status, detail },
        }
    }

    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Network(_)
            | BackendError::Timeout(_)
            | BackendError::Recommendation(_)
            | BackendError::Generation(_)
            | BackendError::Speech(_)
            | BackendError::Server { .. } => true,
            BackendError::Rejected { .. }
            | BackendError::MalformedResponse(_)
            | BackendError::Config(_) => false,
        }
    }

    /// Message suitable for the status line shown to the user
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Network(_) => {
                "Cannot reach the server. Check that the backend is running.".to_string()
            }
            BackendError::Timeout(_) => "The request timed out. Please try again.".to_string(),
            BackendError::Recommendation(_) => {
                "Something went wrong while recommending words.".to_string()
            }
            BackendError::Generation(_) => {
                "The sentence generator is unavailable. Check that the model server is running."
                    .to_string()
            }
            BackendError::Speech(_) => "Something went wrong while generating speech.".to_string(),
            BackendError::Server { detail, .. } => format!("Server error: {}", detail),
            BackendError::Rejected { detail, .. } => detail.clone(),
            BackendError::MalformedResponse(_) => {
                "The server sent an unexpected response.".to_string()
            }
            BackendError::Config(_) => "The backend client is misconfigured.".to_string(),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(timeout_ms)
        } else if err.is_decode() {
            BackendError::MalformedResponse(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}
