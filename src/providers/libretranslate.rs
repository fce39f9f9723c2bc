use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use super::{map_status_error, map_transport_error, RetryPolicy, TranslationClient};

/// LibreTranslate client for machine translation
#[derive(Debug)]
pub struct LibreTranslate {
    /// Full URL of the `/translate` endpoint
    translate_url: Url,
    /// Optional API key for hosted instances
    api_key: Option<String>,
    /// HTTP client for making requests
    client: Client,
    /// Retry behaviour on transient failures
    retry: RetryPolicy,
}

/// Request body of `POST /translate`
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Successful response of `POST /translate`
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Error body returned by LibreTranslate
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl LibreTranslate {
    /// Create a client for the instance at `endpoint` (e.g. `http://localhost:5000`)
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        let base = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };
        let base = if base.ends_with('/') { base } else { format!("{}/", base) };
        let translate_url = Url::parse(&base)
            .and_then(|url| url.join("translate"))
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            translate_url,
            api_key: api_key.filter(|key| !key.is_empty()),
            client,
            retry,
        })
    }

    async fn send_once(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.translate_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(map_status_error(status, message));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl TranslationClient for LibreTranslate {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        self.retry
            .run(self.name(), || self.send_once(text, target_language))
            .await
    }

    fn name(&self) -> &str {
        "LibreTranslate"
    }
}
