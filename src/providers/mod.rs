/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the services a job can
 * translate with:
 * - LibreTranslate: machine translation HTTP API
 * - Ollama: local LLM server
 * - Mock: deterministic in-process client for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use log::warn;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// The pipeline depends only on this interface, so providers can be used
/// interchangeably and replaced by a fake in tests.
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Translate `text` into `target_language`
    ///
    /// # Arguments
    /// * `text` - Natural-language text without surrounding whitespace
    /// * `target_language` - ISO 639 code of the target language
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translation or an error
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}

/// Retry policy shared by the HTTP providers
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Base backoff in milliseconds, doubled on each retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds, fails permanently or retries run out
    pub async fn run<T, F, Fut>(&self, provider: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let backoff = self.backoff_base_ms.saturating_mul(1 << attempt.min(16));
                    warn!(
                        "{} request failed (attempt {}/{}): {}. Retrying in {} ms",
                        provider,
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        backoff
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map a transport error from reqwest into a provider error
pub(crate) fn map_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status into a provider error
pub(crate) fn map_status_error(status: reqwest::StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError { status_code: code, message },
    }
}

pub mod libretranslate;
pub mod mock;
pub mod ollama;
