//! Convenience re-exports for common use.

pub use crate::aggregate::{AggregatorContext, ResponseAggregator};
pub use crate::config::{
    GenerationConfig, GenerationConfigStore, Patch, PartialGenerationConfig, ProviderSettings,
};
pub use crate::error::{ParlanceError, Result};
pub use crate::generation::{GenerationRequest, Pipeline};
pub use crate::models::{CapabilityRegistry, ModelGenerationCapability};
pub use crate::provider::{GenerationProvider, OpenRouterProvider};
pub use crate::reasoning::{AdapterOutcome, AdapterWarning, ReasoningAdapter, WarningKind};
pub use crate::stream::{ParserConfig, StreamParser};
pub use crate::types::{
    AggregationResult, ControlMode, ModelMessage, ReasoningEffort, ReasoningResolvedConfig, Role,
    StreamChunk, Usage,
};
pub use tokio_util::sync::CancellationToken;
