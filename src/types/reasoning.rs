//! Reasoning preferences and the request fields derived from them.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reasoning effort level.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReasoningEffort {
    None,
    Low,
    #[default]
    Medium,
    High,
}

/// How the user wants reasoning controlled.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ControlMode {
    Disabled,
    #[default]
    Effort,
    MaxTokens,
}

/// Concrete reasoning preference after config resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ReasoningResolvedConfig {
    #[builder(default)]
    pub control_mode: ControlMode,
    /// Used only in effort mode.
    #[builder(default)]
    pub effort: ReasoningEffort,
    /// Used only in max-tokens mode.
    pub max_reasoning_tokens: Option<u32>,
    /// User override of the total completion budget.
    pub max_completion_tokens: Option<u32>,
    #[builder(default = true)]
    pub show_reasoning_content: bool,
}

impl Default for ReasoningResolvedConfig {
    fn default() -> Self {
        Self {
            control_mode: ControlMode::default(),
            effort: ReasoningEffort::default(),
            max_reasoning_tokens: None,
            max_completion_tokens: None,
            show_reasoning_content: true,
        }
    }
}

/// The one budget a reasoning directive may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningBudget {
    #[default]
    Unset,
    Effort(ReasoningEffort),
    MaxTokens(u32),
}

/// The `reasoning` request object.
///
/// Serialises as `{effort?, max_tokens?, exclude}`. Holding the budget as a
/// single enum makes it impossible to send both `effort` and `max_tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "WireReasoning", into = "WireReasoning")]
pub struct ReasoningDirective {
    pub budget: ReasoningBudget,
    pub exclude: bool,
}

impl ReasoningDirective {
    pub fn effort(effort: ReasoningEffort, exclude: bool) -> Self {
        Self {
            budget: ReasoningBudget::Effort(effort),
            exclude,
        }
    }

    pub fn max_tokens(tokens: u32, exclude: bool) -> Self {
        Self {
            budget: ReasoningBudget::MaxTokens(tokens),
            exclude,
        }
    }

    pub fn effort_level(&self) -> Option<ReasoningEffort> {
        match self.budget {
            ReasoningBudget::Effort(effort) => Some(effort),
            _ => None,
        }
    }

    pub fn max_tokens_value(&self) -> Option<u32> {
        match self.budget {
            ReasoningBudget::MaxTokens(tokens) => Some(tokens),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireReasoning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    effort: Option<ReasoningEffort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(default)]
    exclude: bool,
}

impl From<ReasoningDirective> for WireReasoning {
    fn from(directive: ReasoningDirective) -> Self {
        Self {
            effort: directive.effort_level(),
            max_tokens: directive.max_tokens_value(),
            exclude: directive.exclude,
        }
    }
}

impl TryFrom<WireReasoning> for ReasoningDirective {
    type Error = String;

    fn try_from(wire: WireReasoning) -> Result<Self, Self::Error> {
        let budget = match (wire.effort, wire.max_tokens) {
            (Some(_), Some(_)) => {
                return Err("reasoning cannot carry both effort and max_tokens".to_string())
            }
            (Some(effort), None) => ReasoningBudget::Effort(effort),
            (None, Some(tokens)) => ReasoningBudget::MaxTokens(tokens),
            (None, None) => ReasoningBudget::Unset,
        };
        Ok(Self {
            budget,
            exclude: wire.exclude,
        })
    }
}

/// Reasoning-related fields destined for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReasoningPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningDirective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_reasoning: Option<bool>,
    /// Total completion budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ReasoningPayload {
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.include_reasoning.is_none() && self.max_tokens.is_none()
    }
}
