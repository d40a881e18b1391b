//! Shared test helpers and mock provider.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use parlance::error::{ParlanceError, Result};
use parlance::provider::{ChatRequestBody, GenerationProvider};
use parlance::stream::{with_cancellation, ChunkStream};
use parlance::types::StreamChunk;

/// A mock provider that replays canned chunks and records what it was sent.
pub struct MockProvider {
    chunks: Mutex<Vec<Result<StreamChunk>>>,
    requests: Mutex<Vec<ChatRequestBody>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue one chunk for the next stream.
    pub fn queue(&self, chunk: StreamChunk) -> &Self {
        self.chunks.lock().unwrap().push(Ok(chunk));
        self
    }

    /// Queue a transport failure for the next stream.
    pub fn queue_error(&self, error: ParlanceError) -> &Self {
        self.chunks.lock().unwrap().push(Err(error));
        self
    }

    pub fn last_request(&self) -> Option<ChatRequestBody> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn stream(&self, request: &ChatRequestBody, cancel: CancellationToken) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(request.clone());
        let chunks: Vec<_> = std::mem::take(&mut *self.chunks.lock().unwrap());
        Ok(with_cancellation(
            Box::pin(futures::stream::iter(chunks)),
            cancel,
        ))
    }
}

/// Anthropic-style record: numeric budget, include_reasoning, 64k cap.
pub fn anthropic_record() -> Value {
    json!({
        "id": "anthropic/claude-sonnet-4",
        "name": "Anthropic: Claude Sonnet 4",
        "supported_parameters": ["reasoning", "include_reasoning", "max_tokens", "temperature", "top_p", "stop"],
        "context_length": 200000,
        "top_provider": {"context_length": 200000, "max_completion_tokens": 64000}
    })
}

/// Plain chat model with no reasoning support.
pub fn plain_record() -> Value {
    json!({
        "id": "mistralai/mistral-small",
        "name": "Mistral Small",
        "supported_parameters": ["max_tokens", "temperature", "top_p", "stop", "seed"],
        "context_length": 32000
    })
}

/// One SSE data line carrying a text delta.
pub fn sse_text(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"id": "gen-1", "choices": [{"delta": {"content": content}}]})
    )
}
