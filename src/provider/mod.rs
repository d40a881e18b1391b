//! Generation provider trait and the HTTP implementation.

pub mod http;
pub mod openrouter;
pub mod request;

pub use openrouter::OpenRouterProvider;
pub use request::{prepare_request, ChatRequestBody, ImageOptions, UsageOptions};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::stream::ChunkStream;

/// Source of canonical chunks for a prepared request.
///
/// Wire providers parse a byte stream; other implementations may produce
/// chunks directly. Either way the output feeds the same aggregator.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider name reported in results.
    fn provider_name(&self) -> &str;

    /// Open a chunk stream. Errors raised before the first chunk are
    /// returned here; later ones are yielded by the stream.
    async fn stream(&self, request: &ChatRequestBody, cancel: CancellationToken) -> Result<ChunkStream>;
}
