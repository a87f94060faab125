//! HTTP client for the language backend

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::retry::RetryPolicy;
use crate::types::{
    Endpoint, ErrorBody, GenerateRequest, GenerateResponse, InitialWordsResponse,
    RecommendDiverseRequest, RecommendRequest, RecommendResponse, TtsRequest,
};

/// Backend client
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    timeout_ms: u64,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        info!("Backend client created for {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(&config),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Starting words for an empty selection
    pub async fn initial_words(&self) -> Result<Vec<String>, BackendError> {
        let endpoint = Endpoint::InitialWords;
        let response: InitialWordsResponse = self
            .retry
            .run(endpoint.as_str(), || self.get_json(endpoint))
            .await?;
        Ok(response.words)
    }

    /// Words likely to follow `word`, given the words selected before it
    pub async fn recommend(&self, word: &str, context: &[String]) -> Result<Vec<String>, BackendError> {
        let endpoint = Endpoint::Recommend;
        let request = RecommendRequest { word, context };
        let response: RecommendResponse = self
            .retry
            .run(endpoint.as_str(), || self.post_json(endpoint, &request))
            .await?;
        Ok(response.recommendations)
    }

    /// Alternative words for paging, none of which appear in `exclude_words`
    pub async fn recommend_diverse(
        &self,
        context: &[String],
        exclude_words: &[String],
    ) -> Result<Vec<String>, BackendError> {
        let endpoint = Endpoint::RecommendDiverse;
        let request = RecommendDiverseRequest {
            context,
            exclude_words,
        };
        let response: RecommendResponse = self
            .retry
            .run(endpoint.as_str(), || self.post_json(endpoint, &request))
            .await?;
        Ok(response.recommendations)
    }

    /// Build a sentence from the selected words
    pub async fn generate(&self, words: &[String]) -> Result<String, BackendError> {
        let endpoint = Endpoint::Generate;
        let request = GenerateRequest { words };
        let response: GenerateResponse = self
            .retry
            .run(endpoint.as_str(), || self.post_json(endpoint, &request))
            .await?;
        Ok(response.sentence)
    }

    /// Synthesize speech; returns MP3 bytes
    pub async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, BackendError> {
        let endpoint = Endpoint::Tts;
        let request = TtsRequest { text };
        let audio = self
            .retry
            .run(endpoint.as_str(), || self.post_bytes(endpoint, &request))
            .await?;
        debug!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get_json<R: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<R, BackendError> {
        debug!("GET {}", endpoint.path());
        let response = self
            .http
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout_ms))?;
        let response = check_status(endpoint, response).await?;
        self.decode(response).await
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.post(endpoint, body).await?;
        self.decode(response).await
    }

    async fn post_bytes<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> Result<Vec<u8>, BackendError> {
        let response = self.post(endpoint, body).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout_ms))?;
        Ok(bytes.to_vec())
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> Result<Response, BackendError> {
        debug!("POST {}", endpoint.path());
        let response = self
            .http
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout_ms))?;
        check_status(endpoint, response).await
    }

    async fn decode<R: DeserializeOwned>(&self, response: Response) -> Result<R, BackendError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout_ms))?;
        serde_json::from_slice(&body).map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }
}

/// Turn a non-success response into a classified error
async fn check_status(endpoint: Endpoint, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.detail,
        Err(_) if text.is_empty() => status.canonical_reason().unwrap_or("unknown error").to_string(),
        Err(_) => text,
    };

    let err = BackendError::from_status(endpoint, status.as_u16(), detail);
    warn!("{} returned {}: {}", endpoint.as_str(), status.as_u16(), err);
    Err(err)
}
