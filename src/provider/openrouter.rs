//! OpenRouter (and any OpenAI-compatible gateway) over HTTP.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::request::ChatRequestBody;
use super::{http, GenerationProvider};
use crate::config::ProviderSettings;
use crate::error::{ParlanceError, Result};
use crate::stream::{chunk_stream, with_cancellation, ChunkStream, ParserConfig};
use crate::util::RetryPolicy;

/// Streams chat completions from an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl OpenRouterProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        settings.validate()?;
        let client = http::build_client(&settings)?;
        let retry = RetryPolicy::with_max_attempts(settings.max_attempts);
        Ok(Self {
            settings,
            client,
            retry,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn headers(&self, api_key: &str) -> HeaderMap {
        http::with_attribution(http::bearer_headers(api_key), &self.settings)
    }

    async fn send(&self, body: &ChatRequestBody, api_key: &str) -> Result<reqwest::Response> {
        let url = self.settings.completions_url();
        debug!(url = %url, model = %body.model, stream = body.stream, "opening generation stream");

        let response = self
            .client
            .post(&url)
            .headers(self.headers(api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = http::retry_after_header(response.headers());
            let body_text = response.text().await.unwrap_or_default();
            return Err(http::status_to_error(status.as_u16(), retry_after, &body_text));
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterProvider {
    fn provider_name(&self) -> &str {
        &self.settings.provider
    }

    async fn stream(&self, request: &ChatRequestBody, cancel: CancellationToken) -> Result<ChunkStream> {
        let api_key = self.settings.require_api_key()?.to_string();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ParlanceError::Cancelled),
            opened = self.retry.execute(&cancel, || self.send(request, &api_key)) => opened?,
        };

        let parser = ParserConfig::with_max_line_bytes(self.settings.max_line_bytes);
        let chunks = chunk_stream(response.bytes_stream(), parser);
        Ok(with_cancellation(chunks, cancel))
    }
}
