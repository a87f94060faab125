//! Word service seam

use std::future::Future;

use backend_client::{BackendClient, BackendError};

/// Source of words, sentences, and speech
pub trait WordService: Send + Sync {
    fn initial_words(&self) -> impl Future<Output = Result<Vec<String>, BackendError>> + Send;

    fn recommend(
        &self,
        word: &str,
        context: &[String],
    ) -> impl Future<Output = Result<Vec<String>, BackendError>> + Send;

    fn recommend_diverse(
        &self,
        context: &[String],
        exclude_words: &[String],
    ) -> impl Future<Output = Result<Vec<String>, BackendError>> + Send;

    fn generate(&self, words: &[String]) -> impl Future<Output = Result<String, BackendError>> + Send;

    fn text_to_speech(&self, text: &str) -> impl Future<Output = Result<Vec<u8>, BackendError>> + Send;
}

impl WordService for BackendClient {
    async fn initial_words(&self) -> Result<Vec<String>, BackendError> {
        BackendClient::initial_words(self).await
    }

    async fn recommend(&self, word: &str, context: &[String]) -> Result<Vec<String>, BackendError> {
        BackendClient::recommend(self, word, context).await
    }

    async fn recommend_diverse(
        &self,
        context: &[String],
        exclude_words: &[String],
    ) -> Result<Vec<String>, BackendError> {
        BackendClient::recommend_diverse(self, context, exclude_words).await
    }

    async fn generate(&self, words: &[String]) -> Result<String, BackendError> {
        BackendClient::generate(self, words).await
    }

    async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, BackendError> {
        BackendClient::text_to_speech(self, text).await
    }
}
