//! Model generation capability descriptor.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::family::ModelFamily;

/// Describes which generation parameters a model accepts.
///
/// Immutable once built; rebuilt whenever provider metadata refreshes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelGenerationCapability {
    pub model_id: String,
    pub parameters: ParameterSupport,
    pub reasoning: ReasoningCapability,
    /// Provider-reported hard cap on completion tokens.
    pub max_completion_tokens: Option<u32>,
    pub context_length: Option<u32>,
    pub supports_image_output: bool,
}

impl ModelGenerationCapability {
    /// Capability for a model with no reasoning support and common sampling parameters.
    pub fn basic(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            parameters: ParameterSupport::common(),
            reasoning: ReasoningCapability::unsupported(ModelFamily::Other),
            max_completion_tokens: None,
            context_length: None,
            supports_image_output: false,
        }
    }

    pub fn family(&self) -> ModelFamily {
        self.reasoning.family
    }
}

/// Per-parameter support flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParameterSupport {
    pub temperature: bool,
    pub top_p: bool,
    pub top_k: bool,
    pub stop: bool,
    pub tools: bool,
    pub seed: bool,
    pub frequency_penalty: bool,
    pub presence_penalty: bool,
    pub response_format: bool,
    pub max_tokens: bool,
}

impl ParameterSupport {
    /// Parameters virtually every chat model accepts.
    pub fn common() -> Self {
        Self {
            temperature: true,
            top_p: true,
            stop: true,
            max_tokens: true,
            ..Self::default()
        }
    }
}

/// Whether a model is known to emit visible reasoning text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReasoningTextEmission {
    Known,
    Unknown,
    ConfirmedNone,
}

/// Reasoning support class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ReasoningClass {
    /// Effort or numeric budget.
    A,
    /// Effort only.
    B,
    /// No reasoning support.
    C,
}

/// Which clamping algorithm applies to a numeric reasoning budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MaxTokensPolicy {
    FixedRangeClamp,
    ProviderUnknownRange,
    EffortOnly,
}

/// Reasoning behaviour of a model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReasoningCapability {
    pub supports_reasoning_param: bool,
    pub supports_include_reasoning: bool,
    pub supports_reasoning_budget: bool,
    pub emits_reasoning_text: ReasoningTextEmission,
    pub family: ModelFamily,
    pub reasoning_class: ReasoningClass,
    pub max_tokens_policy: MaxTokensPolicy,
}

impl ReasoningCapability {
    pub fn unsupported(family: ModelFamily) -> Self {
        Self {
            supports_reasoning_param: false,
            supports_include_reasoning: false,
            supports_reasoning_budget: false,
            emits_reasoning_text: ReasoningTextEmission::ConfirmedNone,
            family,
            reasoning_class: ReasoningClass::C,
            max_tokens_policy: MaxTokensPolicy::EffortOnly,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.reasoning_class != ReasoningClass::C
    }
}
