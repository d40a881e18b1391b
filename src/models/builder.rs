//! Builds [`ModelGenerationCapability`] descriptors from provider metadata.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::capabilities::{
    MaxTokensPolicy, ModelGenerationCapability, ParameterSupport, ReasoningCapability,
    ReasoningClass, ReasoningTextEmission,
};
use super::family::{detect_family, ModelFamily};
use crate::error::{ParlanceError, Result};

/// One provider's raw per-model record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawModelRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub supported_parameters: Vec<String>,
    #[serde(default)]
    pub context_length: Option<u32>,
    #[serde(default)]
    pub top_provider: Option<RawProviderLimits>,
    #[serde(default)]
    pub pricing: Option<RawPricing>,
    #[serde(default)]
    pub architecture: Option<RawArchitecture>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawProviderLimits {
    #[serde(default)]
    pub context_length: Option<u32>,
    #[serde(default)]
    pub max_completion_tokens: Option<u32>,
}

/// Prices arrive as decimal strings or numbers depending on the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawPricing {
    #[serde(default)]
    pub prompt: Option<serde_json::Value>,
    #[serde(default)]
    pub completion: Option<serde_json::Value>,
    #[serde(default)]
    pub internal_reasoning: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawArchitecture {
    #[serde(default)]
    pub input_modalities: Vec<String>,
    #[serde(default)]
    pub output_modalities: Vec<String>,
}

impl RawModelRecord {
    /// Deserialize and validate a record.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let record: Self = serde_json::from_value(value.clone())?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ParlanceError::InvalidArgument(
                "model record has an empty id".to_string(),
            ));
        }
        Ok(())
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.supported_parameters.iter().any(|p| p == name)
    }
}

/// Why a model was judged reasoning-capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEvidence {
    SupportedParameter,
    MetadataMarker,
    Keyword,
}

const REASONING_PARAMETERS: &[&str] = &["reasoning", "include_reasoning", "reasoning_effort"];
const REASONING_MARKERS: &[&str] = &["reasoning", "thinking", "chain-of-thought"];

/// Families that accept a numeric reasoning budget across the board.
const BUDGET_FAMILIES: &[ModelFamily] = &[ModelFamily::Anthropic, ModelFamily::Gemini, ModelFamily::Qwen];

/// Individually budget-capable models outside [`BUDGET_FAMILIES`].
const BUDGET_CAPABLE_MODELS: &[(ModelFamily, &str)] = &[
    (ModelFamily::DeepSeek, r"v3\.[1-9]"),
    (ModelFamily::Other, r"glm-4\.[5-9]|hunyuan-a13b"),
];

/// Keywords in an id or name indicating a step-by-step or budgeted thinking model.
const REASONING_KEYWORDS: &str =
    r"thinking|reasoner|reasoning|qwq|magistral|(?:^|[/\-:])r1(?:$|[\-:])|(?:^|/)o[1-9](?:-|$)";

fn reasoning_keyword_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(REASONING_KEYWORDS).ok())
        .as_ref()
}

fn budget_patterns() -> &'static [(ModelFamily, Regex)] {
    static PATTERNS: OnceLock<Vec<(ModelFamily, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        BUDGET_CAPABLE_MODELS
            .iter()
            .filter_map(|(family, pattern)| Regex::new(pattern).ok().map(|re| (*family, re)))
            .collect()
    })
}

/// Detect reasoning support; first matching source wins.
pub fn detect_reasoning(record: &RawModelRecord) -> Option<ReasoningEvidence> {
    if REASONING_PARAMETERS.iter().any(|p| record.has_parameter(p)) {
        return Some(ReasoningEvidence::SupportedParameter);
    }

    let marker_in = |text: &str| {
        let lower = text.to_ascii_lowercase();
        REASONING_MARKERS.iter().any(|m| lower.contains(m))
    };
    let metadata_marked = record
        .capabilities
        .iter()
        .chain(record.tags.iter())
        .any(|value| marker_in(value.as_str()))
        || record.description.as_deref().is_some_and(marker_in)
        || record
            .pricing
            .as_ref()
            .and_then(|p| p.internal_reasoning.as_ref())
            .and_then(price_value)
            .is_some_and(|price| price > 0.0);
    if metadata_marked {
        return Some(ReasoningEvidence::MetadataMarker);
    }

    let id = record.id.to_ascii_lowercase();
    let name = record.name.as_deref().unwrap_or_default().to_ascii_lowercase();
    if let Some(pattern) = reasoning_keyword_pattern() {
        if pattern.is_match(&id) || pattern.is_match(&name) {
            return Some(ReasoningEvidence::Keyword);
        }
    }

    None
}

fn price_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn classify(family: ModelFamily, model_id: &str, supported: bool) -> ReasoningClass {
    if !supported {
        return ReasoningClass::C;
    }
    if BUDGET_FAMILIES.contains(&family) {
        return ReasoningClass::A;
    }
    let id = model_id.to_ascii_lowercase();
    let budget_listed = budget_patterns()
        .iter()
        .any(|(listed_family, pattern)| *listed_family == family && pattern.is_match(&id));
    if budget_listed {
        ReasoningClass::A
    } else {
        ReasoningClass::B
    }
}

fn select_policy(family: ModelFamily, class: ReasoningClass) -> MaxTokensPolicy {
    match (class, family) {
        (ReasoningClass::A, ModelFamily::Anthropic) => MaxTokensPolicy::FixedRangeClamp,
        (ReasoningClass::A, _) => MaxTokensPolicy::ProviderUnknownRange,
        _ => MaxTokensPolicy::EffortOnly,
    }
}

fn text_emission(
    record: &RawModelRecord,
    family: ModelFamily,
    evidence: Option<ReasoningEvidence>,
) -> ReasoningTextEmission {
    match evidence {
        None => ReasoningTextEmission::ConfirmedNone,
        // o-series models only return summaries, never the raw trace.
        Some(_) if family == ModelFamily::OpenAi => ReasoningTextEmission::ConfirmedNone,
        Some(_) if record.has_parameter("include_reasoning") => ReasoningTextEmission::Known,
        Some(ReasoningEvidence::Keyword) => ReasoningTextEmission::Known,
        Some(_) => ReasoningTextEmission::Unknown,
    }
}

fn parameter_support(record: &RawModelRecord) -> ParameterSupport {
    if record.supported_parameters.is_empty() {
        return ParameterSupport::common();
    }
    ParameterSupport {
        temperature: record.has_parameter("temperature"),
        top_p: record.has_parameter("top_p"),
        top_k: record.has_parameter("top_k"),
        stop: record.has_parameter("stop"),
        tools: record.has_parameter("tools"),
        seed: record.has_parameter("seed"),
        frequency_penalty: record.has_parameter("frequency_penalty"),
        presence_penalty: record.has_parameter("presence_penalty"),
        response_format: record.has_parameter("response_format")
            || record.has_parameter("structured_outputs"),
        max_tokens: record.has_parameter("max_tokens"),
    }
}

/// Build the capability descriptor for one record. Pure.
pub fn build_capability(record: &RawModelRecord) -> ModelGenerationCapability {
    let family = detect_family(&record.id, record.name.as_deref());
    let evidence = detect_reasoning(record);
    let reasoning_class = classify(family, &record.id, evidence.is_some());
    let max_tokens_policy = select_policy(family, reasoning_class);

    let reasoning = ReasoningCapability {
        supports_reasoning_param: evidence.is_some(),
        supports_include_reasoning: evidence.is_some() && record.has_parameter("include_reasoning"),
        supports_reasoning_budget: reasoning_class == ReasoningClass::A,
        emits_reasoning_text: text_emission(record, family, evidence),
        family,
        reasoning_class,
        max_tokens_policy,
    };

    let limits = record.top_provider.as_ref();
    ModelGenerationCapability {
        model_id: record.id.clone(),
        parameters: parameter_support(record),
        reasoning,
        max_completion_tokens: limits.and_then(|l| l.max_completion_tokens),
        context_length: limits
            .and_then(|l| l.context_length)
            .or(record.context_length),
        supports_image_output: record
            .architecture
            .as_ref()
            .is_some_and(|a| a.output_modalities.iter().any(|m| m == "image")),
    }
}

/// Build descriptors for a batch of raw records.
///
/// Malformed records are skipped with a warning; they never fail the batch.
pub fn build_capabilities(records: &[serde_json::Value]) -> Vec<ModelGenerationCapability> {
    let mut built = Vec::with_capacity(records.len());
    for (index, value) in records.iter().enumerate() {
        match RawModelRecord::from_value(value) {
            Ok(record) => built.push(build_capability(&record)),
            Err(err) => {
                let id = value.get("id").and_then(|v| v.as_str()).unwrap_or("<missing>");
                warn!(index, id, error = %err, "skipping malformed model record");
            }
        }
    }
    debug!(
        received = records.len(),
        built = built.len(),
        "built model capabilities"
    );
    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawModelRecord {
        RawModelRecord::from_value(&value).unwrap()
    }

    #[test]
    fn supported_parameter_is_checked_first() {
        let r = record(json!({
            "id": "mistralai/mistral-small",
            "supported_parameters": ["reasoning", "temperature"]
        }));
        assert_eq!(detect_reasoning(&r), Some(ReasoningEvidence::SupportedParameter));
    }

    #[test]
    fn metadata_marker_detected() {
        let r = record(json!({
            "id": "vendor/plain-model",
            "description": "A hybrid model with extended Thinking mode"
        }));
        assert_eq!(detect_reasoning(&r), Some(ReasoningEvidence::MetadataMarker));

        let priced = record(json!({
            "id": "vendor/other",
            "pricing": {"prompt": "0.000001", "internal_reasoning": "0.000004"}
        }));
        assert_eq!(detect_reasoning(&priced), Some(ReasoningEvidence::MetadataMarker));
    }

    #[test]
    fn keyword_detection_on_id() {
        let r = record(json!({"id": "deepseek/deepseek-r1"}));
        assert_eq!(detect_reasoning(&r), Some(ReasoningEvidence::Keyword));
        let plain = record(json!({"id": "meta-llama/llama-3.1-8b-instruct"}));
        assert_eq!(detect_reasoning(&plain), None);
    }

    #[test]
    fn zero_internal_reasoning_price_is_not_a_marker() {
        let r = record(json!({
            "id": "vendor/cheap",
            "pricing": {"internal_reasoning": "0"}
        }));
        assert_eq!(detect_reasoning(&r), None);
    }

    #[test]
    fn deepseek_v31_is_budget_capable() {
        let cap = build_capability(&record(json!({
            "id": "deepseek/deepseek-chat-v3.1",
            "supported_parameters": ["reasoning", "include_reasoning"]
        })));
        assert_eq!(cap.reasoning.reasoning_class, ReasoningClass::A);
        assert_eq!(cap.reasoning.max_tokens_policy, MaxTokensPolicy::ProviderUnknownRange);
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(RawModelRecord::from_value(&json!({"id": "  "})).is_err());
    }
}
