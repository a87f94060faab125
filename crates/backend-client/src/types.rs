//! Backend wire types

use serde::{Deserialize, Serialize};

/// Backend endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    InitialWords,
    Recommend,
    RecommendDiverse,
    Generate,
    Tts,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::InitialWords => "/api/initial-words",
            Endpoint::Recommend => "/api/recommend",
            Endpoint::RecommendDiverse => "/api/recommend-diverse",
            Endpoint::Generate => "/api/generate",
            Endpoint::Tts => "/api/tts",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::InitialWords => "initial-words",
            Endpoint::Recommend => "recommend",
            Endpoint::RecommendDiverse => "recommend-diverse",
            Endpoint::Generate => "generate",
            Endpoint::Tts => "tts",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendRequest<'a> {
    pub word: &'a str,
    pub context: &'a [String],
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendDiverseRequest<'a> {
    pub context: &'a [String],
    pub exclude_words: &'a [String],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialWordsResponse {
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub words: &'a [String],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
}

/// Error body returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
