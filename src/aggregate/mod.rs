//! Folds a chunk sequence into one [`AggregationResult`].

pub mod images;
pub mod reasoning;

pub use images::{normalize_image, ImageSet};
pub use reasoning::ReasoningAccumulator;

use bon::Builder;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ErrorCode, ErrorDetails, ParlanceError, Result};
use crate::reasoning::AdapterWarning;
use crate::types::{
    AggregationResult, ReasoningPayload, ReasoningResolvedConfig, StreamChunk, StreamError, Usage,
};

/// What the aggregator knows about the request it is collecting for.
#[derive(Debug, Clone, Default, Builder)]
pub struct AggregatorContext {
    #[builder(into)]
    pub provider: String,
    #[builder(into)]
    pub model: String,
    /// Reasoning preference the user asked for.
    pub preference: Option<ReasoningResolvedConfig>,
    /// Reasoning fields actually sent.
    pub sent: Option<ReasoningPayload>,
    #[builder(default)]
    pub warnings: Vec<AdapterWarning>,
}

/// Per-request accumulator. Not shared across requests.
#[derive(Debug)]
pub struct ResponseAggregator {
    context: AggregatorContext,
    generation_id: Uuid,
    started_at: DateTime<Utc>,
    text: String,
    images: ImageSet,
    reasoning: ReasoningAccumulator,
    usage: Option<Usage>,
    usage_forwarded: bool,
    failed: bool,
}

impl ResponseAggregator {
    pub fn new(context: AggregatorContext) -> Self {
        Self {
            context,
            generation_id: Uuid::new_v4(),
            started_at: Utc::now(),
            text: String::new(),
            images: ImageSet::default(),
            reasoning: ReasoningAccumulator::default(),
            usage: None,
            usage_forwarded: false,
            failed: false,
        }
    }

    pub fn generation_id(&self) -> Uuid {
        self.generation_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Accumulate one chunk.
    ///
    /// Returns the chunk to forward downstream, or `None` when it was a
    /// duplicate. An `Error` chunk fails the aggregation.
    pub fn push(&mut self, chunk: StreamChunk) -> Result<Option<StreamChunk>> {
        if self.failed {
            return Err(ParlanceError::InvalidState(
                "aggregation already failed".to_string(),
            ));
        }

        let forwarded = match chunk {
            StreamChunk::Text { content } => {
                self.text.push_str(&content);
                Some(StreamChunk::Text { content })
            }
            StreamChunk::Image { content } => {
                let inserted = self.images.insert(&content);
                if inserted.is_none() {
                    debug!(model = %self.context.model, "dropping duplicate image");
                }
                inserted.map(StreamChunk::image)
            }
            StreamChunk::ReasoningDetail(detail) => self
                .reasoning
                .push_detail(&detail)
                .then_some(StreamChunk::ReasoningDetail(detail)),
            StreamChunk::ReasoningStreamText { text } => {
                self.reasoning.push_text(&text);
                Some(StreamChunk::ReasoningStreamText { text })
            }
            StreamChunk::ReasoningSummary(summary) => {
                self.reasoning.inject_summary(summary.clone());
                Some(StreamChunk::ReasoningSummary(summary))
            }
            StreamChunk::Usage(usage) => {
                match &mut self.usage {
                    Some(existing) => existing.merge(&usage),
                    None => self.usage = Some(usage.clone()),
                }
                if self.usage_forwarded {
                    None
                } else {
                    self.usage_forwarded = true;
                    Some(StreamChunk::Usage(usage))
                }
            }
            StreamChunk::Error(error) => {
                self.failed = true;
                warn!(
                    model = %self.context.model,
                    code = ?error.code,
                    "provider reported an error mid-stream"
                );
                return Err(stream_error(error));
            }
        };
        Ok(forwarded)
    }

    /// Freeze the accumulated state.
    pub fn finish(self) -> AggregationResult {
        let reasoning = self.reasoning.summarize(
            self.context.preference.as_ref(),
            self.context.sent.as_ref(),
            &self.context.provider,
            &self.context.model,
        );
        AggregationResult {
            generation_id: self.generation_id,
            text: self.text,
            images: self.images.into_vec(),
            usage: self.usage,
            reasoning,
            reasoning_details: self.reasoning.into_details(),
            provider: self.context.provider,
            model: self.context.model,
            warnings: self.context.warnings,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Turn an in-band error into the error a failed HTTP status would produce.
pub fn stream_error(error: StreamError) -> ParlanceError {
    let status = error
        .code
        .as_deref()
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|status| (400..=599).contains(status))
        .unwrap_or(502);
    let details = ErrorDetails {
        code: Some(ErrorCode::from_status(status)),
        provider_code: error.code,
        ..Default::default()
    };
    ParlanceError::from_status(status, error.message, None, Some(details))
}

/// Drive `stream` to completion through `aggregator`, handing every
/// forwarded chunk to `on_chunk`.
pub async fn collect<S, F>(
    stream: S,
    mut aggregator: ResponseAggregator,
    mut on_chunk: F,
) -> Result<AggregationResult>
where
    S: Stream<Item = Result<StreamChunk>>,
    F: FnMut(&StreamChunk),
{
    futures::pin_mut!(stream);
    while let Some(item) = stream.next().await {
        if let Some(chunk) = aggregator.push(item?)? {
            on_chunk(&chunk);
        }
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use pretty_assertions::assert_eq;

    fn aggregator() -> ResponseAggregator {
        ResponseAggregator::new(
            AggregatorContext::builder()
                .provider("openrouter")
                .model("vendor/model")
                .build(),
        )
    }

    #[test]
    fn concatenates_text() {
        let mut agg = aggregator();
        for piece in ["Hel", "lo ", "world"] {
            agg.push(StreamChunk::text(piece)).unwrap();
        }
        assert_eq!(agg.finish().text, "Hello world");
    }

    #[test]
    fn usage_forwarded_once_and_merged() {
        let mut agg = aggregator();
        let first = serde_json::json!({"prompt_tokens": 3});
        let second = serde_json::json!({"prompt_tokens": 4, "completion_tokens": 9});
        let usage = |v: serde_json::Value| {
            StreamChunk::Usage(Usage::from_wire(v.as_object().unwrap(), None))
        };
        assert!(agg.push(usage(first)).unwrap().is_some());
        assert!(agg.push(usage(second)).unwrap().is_none());
        let result = agg.finish();
        let merged = result.usage.unwrap();
        assert_eq!(merged.prompt_tokens(), Some(4));
        assert_eq!(merged.completion_tokens(), Some(9));
    }

    #[test]
    fn error_chunk_fails_like_transport_error() {
        let mut agg = aggregator();
        let err = agg
            .push(StreamChunk::error("quota exceeded", Some("429".into())))
            .unwrap_err();
        assert!(matches!(err, ParlanceError::RateLimited { .. }));
        assert!(matches!(
            agg.push(StreamChunk::text("late")),
            Err(ParlanceError::InvalidState(_))
        ));
    }

    #[test]
    fn error_without_status_code_is_bad_gateway() {
        let err = stream_error(StreamError {
            message: "model crashed".into(),
            code: Some("internal".into()),
        });
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.category(), ErrorCategory::Server);
    }

    #[test]
    fn duplicate_images_are_suppressed() {
        let mut agg = aggregator();
        for _ in 0..3 {
            agg.push(StreamChunk::image("https://img/1.png")).unwrap();
        }
        assert_eq!(agg.finish().images, vec!["https://img/1.png".to_string()]);
    }
}
