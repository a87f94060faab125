//! Backend Client
//!
//! Async HTTP client for the language backend:
//! - Initial words and next-word recommendations
//! - Diverse recommendations for paging
//! - Sentence generation
//! - Text-to-speech audio
//!
//! Failures are classified into [`BackendError`] variants that carry a
//! user-facing message; transient ones are retried with linear backoff.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use client::BackendClient;
pub use config::BackendConfig;
pub use error::BackendError;
pub use retry::RetryPolicy;
pub use types::Endpoint;
