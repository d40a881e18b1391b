//! Generation configuration: the concrete form and its sparse layers.

use serde::{Deserialize, Serialize};

use super::patch::{Overlay, Patch};
use crate::types::{ControlMode, ReasoningEffort, ReasoningResolvedConfig};

/// Fully specified generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub seed: Option<u64>,
    pub system_prompt: Option<String>,
    pub stream: bool,
    pub reasoning: ReasoningResolvedConfig,
    pub image: ImageConfig,
    pub web_search: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: None,
            top_p: None,
            top_k: None,
            stop: None,
            seed: None,
            system_prompt: None,
            stream: true,
            reasoning: ReasoningResolvedConfig::default(),
            image: ImageConfig::default(),
            web_search: false,
        }
    }
}

impl GenerationConfig {
    /// Apply one sparse layer on top of this configuration.
    pub fn apply(&mut self, layer: &PartialGenerationConfig) {
        layer.apply_to(self);
    }

    /// Fold layers in precedence order (lowest first) over the built-in default.
    pub fn resolve<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a PartialGenerationConfig>,
    {
        let mut config = Self::default();
        for layer in layers {
            config.apply(layer);
        }
        config
    }
}

/// Image output options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Request the image output modality.
    pub enabled: bool,
    pub aspect_ratio: Option<String>,
    pub image_size: Option<String>,
}

/// Sparse generation configuration for one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialGenerationConfig {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub temperature: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub top_p: Patch<f64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub top_k: Patch<u32>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub stop: Patch<Vec<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub seed: Patch<u64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub system_prompt: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub stream: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub reasoning: Patch<PartialReasoningConfig>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub image: Patch<PartialImageConfig>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub web_search: Patch<bool>,
}

impl PartialGenerationConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Overlay for PartialGenerationConfig {
    type Target = GenerationConfig;

    fn apply_to(&self, target: &mut GenerationConfig) {
        let defaults = GenerationConfig::default();
        self.temperature.apply_option(&mut target.temperature);
        self.top_p.apply_option(&mut target.top_p);
        self.top_k.apply_option(&mut target.top_k);
        self.stop.apply_option(&mut target.stop);
        self.seed.apply_option(&mut target.seed);
        self.system_prompt.apply_option(&mut target.system_prompt);
        self.stream.apply_value(&mut target.stream, defaults.stream);
        self.reasoning
            .apply_nested(&mut target.reasoning, defaults.reasoning);
        self.image.apply_nested(&mut target.image, defaults.image);
        self.web_search
            .apply_value(&mut target.web_search, defaults.web_search);
    }

    fn overlay(&self, upper: &Self) -> Self {
        Self {
            temperature: self.temperature.overlay(&upper.temperature),
            top_p: self.top_p.overlay(&upper.top_p),
            top_k: self.top_k.overlay(&upper.top_k),
            stop: self.stop.overlay(&upper.stop),
            seed: self.seed.overlay(&upper.seed),
            system_prompt: self.system_prompt.overlay(&upper.system_prompt),
            stream: self.stream.overlay(&upper.stream),
            reasoning: self.reasoning.overlay_nested(&upper.reasoning),
            image: self.image.overlay_nested(&upper.image),
            web_search: self.web_search.overlay(&upper.web_search),
        }
    }

    fn on_cleared(&self) -> Self {
        Self {
            temperature: self.temperature.or_clear(),
            top_p: self.top_p.or_clear(),
            top_k: self.top_k.or_clear(),
            stop: self.stop.or_clear(),
            seed: self.seed.or_clear(),
            system_prompt: self.system_prompt.or_clear(),
            stream: self.stream.or_clear(),
            reasoning: match &self.reasoning {
                Patch::Set(layer) => Patch::Set(layer.on_cleared()),
                other => other.or_clear(),
            },
            image: match &self.image {
                Patch::Set(layer) => Patch::Set(layer.on_cleared()),
                other => other.or_clear(),
            },
            web_search: self.web_search.or_clear(),
        }
    }
}

/// Sparse reasoning preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialReasoningConfig {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub control_mode: Patch<ControlMode>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub effort: Patch<ReasoningEffort>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub max_reasoning_tokens: Patch<u32>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub max_completion_tokens: Patch<u32>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub show_reasoning_content: Patch<bool>,
}

impl Overlay for PartialReasoningConfig {
    type Target = ReasoningResolvedConfig;

    fn apply_to(&self, target: &mut ReasoningResolvedConfig) {
        let defaults = ReasoningResolvedConfig::default();
        self.control_mode
            .apply_value(&mut target.control_mode, defaults.control_mode);
        self.effort.apply_value(&mut target.effort, defaults.effort);
        self.max_reasoning_tokens
            .apply_option(&mut target.max_reasoning_tokens);
        self.max_completion_tokens
            .apply_option(&mut target.max_completion_tokens);
        self.show_reasoning_content.apply_value(
            &mut target.show_reasoning_content,
            defaults.show_reasoning_content,
        );
    }

    fn overlay(&self, upper: &Self) -> Self {
        Self {
            control_mode: self.control_mode.overlay(&upper.control_mode),
            effort: self.effort.overlay(&upper.effort),
            max_reasoning_tokens: self.max_reasoning_tokens.overlay(&upper.max_reasoning_tokens),
            max_completion_tokens: self
                .max_completion_tokens
                .overlay(&upper.max_completion_tokens),
            show_reasoning_content: self
                .show_reasoning_content
                .overlay(&upper.show_reasoning_content),
        }
    }

    fn on_cleared(&self) -> Self {
        Self {
            control_mode: self.control_mode.or_clear(),
            effort: self.effort.or_clear(),
            max_reasoning_tokens: self.max_reasoning_tokens.or_clear(),
            max_completion_tokens: self.max_completion_tokens.or_clear(),
            show_reasoning_content: self.show_reasoning_content.or_clear(),
        }
    }
}

/// Sparse image options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialImageConfig {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub enabled: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub aspect_ratio: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub image_size: Patch<String>,
}

impl Overlay for PartialImageConfig {
    type Target = ImageConfig;

    fn apply_to(&self, target: &mut ImageConfig) {
        self.enabled.apply_value(&mut target.enabled, false);
        self.aspect_ratio.apply_option(&mut target.aspect_ratio);
        self.image_size.apply_option(&mut target.image_size);
    }

    fn overlay(&self, upper: &Self) -> Self {
        Self {
            enabled: self.enabled.overlay(&upper.enabled),
            aspect_ratio: self.aspect_ratio.overlay(&upper.aspect_ratio),
            image_size: self.image_size.overlay(&upper.image_size),
        }
    }

    fn on_cleared(&self) -> Self {
        Self {
            enabled: self.enabled.or_clear(),
            aspect_ratio: self.aspect_ratio.or_clear(),
            image_size: self.image_size.or_clear(),
        }
    }
}
