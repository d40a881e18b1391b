//! End-to-end generation: resolve config, adapt reasoning, send, aggregate.

use std::sync::Arc;

use bon::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregate::{collect, AggregatorContext, ResponseAggregator};
use crate::config::{GenerationConfig, GenerationConfigStore, PartialGenerationConfig};
use crate::error::Result;
use crate::models::{CapabilityRegistry, ModelGenerationCapability};
use crate::provider::{prepare_request, ChatRequestBody, GenerationProvider};
use crate::reasoning::{AdapterOutcome, ReasoningAdapter};
use crate::types::{AggregationResult, ModelMessage, StreamChunk};

/// One generation request from the caller.
#[derive(Debug, Clone, Builder)]
pub struct GenerationRequest {
    #[builder(into)]
    pub model_id: String,
    #[builder(into)]
    pub conversation_id: Option<String>,
    pub messages: Vec<ModelMessage>,
    /// Per-request override layer.
    pub overrides: Option<PartialGenerationConfig>,
}

/// Everything computed before the request is sent.
#[derive(Debug, Clone)]
pub struct PreparedGeneration {
    pub capability: ModelGenerationCapability,
    pub config: GenerationConfig,
    pub outcome: AdapterOutcome,
    pub body: ChatRequestBody,
}

/// Ties the capability registry, config store, adapter and provider together.
#[derive(Clone)]
pub struct Pipeline {
    registry: CapabilityRegistry,
    configs: GenerationConfigStore,
    adapter: ReasoningAdapter,
    provider: Arc<dyn GenerationProvider>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("models", &self.registry.len())
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        registry: CapabilityRegistry,
        configs: GenerationConfigStore,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            registry,
            configs,
            adapter: ReasoningAdapter::default(),
            provider,
        }
    }

    pub fn with_adapter(mut self, adapter: ReasoningAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn configs(&self) -> &GenerationConfigStore {
        &self.configs
    }

    /// Resolve, adapt and build the request body without sending it.
    pub fn prepare(&self, request: &GenerationRequest) -> Result<PreparedGeneration> {
        let capability = self.registry.get(&request.model_id)?;
        let config = self.configs.resolve(
            Some(&request.model_id),
            request.conversation_id.as_deref(),
            request.overrides.as_ref(),
        );
        let outcome = self.adapter.adapt(&capability, &config.reasoning);
        let body = prepare_request(&request.messages, &capability, &config, &outcome);
        Ok(PreparedGeneration {
            capability,
            config,
            outcome,
            body,
        })
    }

    /// Run one generation, handing each forwarded chunk to `on_chunk`.
    ///
    /// A cancelled run returns [`ParlanceError::Cancelled`](crate::error::ParlanceError::Cancelled).
    pub async fn run<F>(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
        on_chunk: F,
    ) -> Result<AggregationResult>
    where
        F: FnMut(&StreamChunk),
    {
        let prepared = self.prepare(request)?;
        for warning in &prepared.outcome.warnings {
            debug!(
                model = %request.model_id,
                kind = %warning.kind,
                field = %warning.field,
                "{}",
                warning.message
            );
        }

        let stream = self.provider.stream(&prepared.body, cancel).await?;
        let aggregator = ResponseAggregator::new(
            AggregatorContext::builder()
                .provider(self.provider.provider_name())
                .model(request.model_id.clone())
                .preference(prepared.config.reasoning.clone())
                .sent(prepared.outcome.payload)
                .warnings(prepared.outcome.warnings.clone())
                .build(),
        );
        let result = collect(stream, aggregator, on_chunk).await?;
        info!(
            model = %result.model,
            generation_id = %result.generation_id,
            chars = result.text.len(),
            images = result.images.len(),
            "generation finished"
        );
        Ok(result)
    }
}
