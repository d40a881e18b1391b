//! Outgoing chat-completions request body.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::models::ModelGenerationCapability;
use crate::reasoning::AdapterOutcome;
use crate::types::{ModelMessage, ReasoningPayload, Role};

/// Request body for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequestBody {
    pub model: String,
    pub messages: Vec<Value>,
    pub stream: bool,
    #[serde(flatten)]
    pub reasoning: ReasoningPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modalities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageOptions>,
    pub usage: UsageOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageOptions {
    pub include: bool,
}

/// Assemble the request body.
///
/// Reasoning fields and the completion budget come straight from the
/// adapter; sampling fields are sent only when the model accepts them.
pub fn prepare_request(
    messages: &[ModelMessage],
    cap: &ModelGenerationCapability,
    config: &GenerationConfig,
    outcome: &AdapterOutcome,
) -> ChatRequestBody {
    let params = &cap.parameters;
    let mut wire_messages = Vec::with_capacity(messages.len() + 1);
    if let Some(system) = config.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
        if messages.first().map(|m| m.role) != Some(Role::System) {
            wire_messages.push(ModelMessage::system(system).to_wire());
        }
    }
    wire_messages.extend(messages.iter().map(ModelMessage::to_wire));

    let images = config.image.enabled && cap.supports_image_output;
    if config.image.enabled && !images {
        debug!(model = %cap.model_id, "image output requested but not supported; skipping");
    }
    let image_config = images
        .then(|| ImageOptions {
            aspect_ratio: config.image.aspect_ratio.clone(),
            image_size: config.image.image_size.clone(),
        })
        .filter(|o| o.aspect_ratio.is_some() || o.image_size.is_some());

    ChatRequestBody {
        model: cap.model_id.clone(),
        messages: wire_messages,
        stream: config.stream,
        reasoning: outcome.payload,
        temperature: config.temperature.filter(|_| params.temperature),
        top_p: config.top_p.filter(|_| params.top_p),
        top_k: config.top_k.filter(|_| params.top_k),
        stop: config.stop.clone().filter(|s| params.stop && !s.is_empty()),
        seed: config.seed.filter(|_| params.seed),
        modalities: images.then(|| vec!["image".to_string(), "text".to_string()]),
        plugins: config.web_search.then(|| vec![json!({"id": "web"})]),
        image_config,
        usage: UsageOptions { include: true },
    }
}
