//! Maps a model capability and a resolved reasoning preference onto the
//! request fields the provider accepts, with advisories for every change.

pub mod budget;
mod policy;
pub mod warnings;

pub use budget::{CompletionBudgetStrategy, RangeCompletionStrategy};
pub use warnings::{AdapterOutcome, AdapterWarning, WarningKind};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MaxTokensPolicy, ModelGenerationCapability, ReasoningTextEmission};
use crate::types::{ControlMode, ReasoningResolvedConfig};

/// Smallest reasoning budget the fixed-range family accepts.
pub const FIXED_RANGE_MIN_TOKENS: u32 = 1024;
/// Largest reasoning budget the fixed-range family accepts.
pub const FIXED_RANGE_MAX_TOKENS: u32 = 32_000;
/// Headroom kept between a provider cap and a numeric reasoning budget.
pub const PROVIDER_SAFETY_MARGIN: u32 = 1024;

/// Tunables for [`ReasoningAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    pub completion: CompletionBudgetStrategy,
    pub range_completion: RangeCompletionStrategy,
    /// Inclusive reasoning-budget range for the fixed-range policy.
    pub budget_range: (u32, u32),
    pub safety_margin: u32,
    /// Gap used when the completion budget has to be raised.
    pub auto_adjust_gap: u32,
}

impl AdapterSettings {
    /// `budget_range` as `(low, high)`, whichever order it was configured in.
    pub fn budget_bounds(&self) -> (u32, u32) {
        let (a, b) = self.budget_range;
        (a.min(b), a.max(b))
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            completion: CompletionBudgetStrategy::default(),
            range_completion: RangeCompletionStrategy::default(),
            budget_range: (FIXED_RANGE_MIN_TOKENS, FIXED_RANGE_MAX_TOKENS),
            safety_margin: PROVIDER_SAFETY_MARGIN,
            auto_adjust_gap: 1024,
        }
    }
}

/// Stateless reasoning adapter.
#[derive(Debug, Clone, Default)]
pub struct ReasoningAdapter {
    settings: AdapterSettings,
}

impl ReasoningAdapter {
    pub fn new(settings: AdapterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    /// Compute the reasoning payload for one request.
    pub fn adapt(
        &self,
        cap: &ModelGenerationCapability,
        cfg: &ReasoningResolvedConfig,
    ) -> AdapterOutcome {
        if !cap.reasoning.is_supported() {
            return policy::unsupported(cap);
        }

        let outcome = match cfg.control_mode {
            ControlMode::Disabled => policy::disabled(cfg),
            ControlMode::Effort => policy::effort(cap, cfg, &self.settings.completion),
            ControlMode::MaxTokens => match cfg.max_reasoning_tokens.filter(|n| *n > 0) {
                None => policy::missing_budget(cap, cfg, &self.settings.completion),
                Some(requested) => self.budgeted(cap, cfg, requested),
            },
        };

        let outcome = outcome
            .map_payload(|payload| crate::types::ReasoningPayload {
                include_reasoning: cap.reasoning.supports_include_reasoning.then_some(
                    cfg.show_reasoning_content && cfg.control_mode != ControlMode::Disabled,
                ),
                ..payload
            })
            .with_warnings(visibility_advisory(cap, cfg));

        debug!(
            model = %cap.model_id,
            mode = %cfg.control_mode,
            policy = %cap.reasoning.max_tokens_policy,
            warnings = outcome.warnings.len(),
            "adapted reasoning preferences"
        );
        outcome
    }

    fn budgeted(
        &self,
        cap: &ModelGenerationCapability,
        cfg: &ReasoningResolvedConfig,
        requested: u32,
    ) -> AdapterOutcome {
        match cap.reasoning.max_tokens_policy {
            MaxTokensPolicy::FixedRangeClamp => {
                policy::fixed_range_clamp(cap, cfg, requested, &self.settings)
            }
            MaxTokensPolicy::ProviderUnknownRange => {
                policy::provider_unknown_range(cap, cfg, requested, self.settings.safety_margin)
            }
            MaxTokensPolicy::EffortOnly => policy::effort_only(cap, cfg, requested),
        }
    }
}

fn visibility_advisory(
    cap: &ModelGenerationCapability,
    cfg: &ReasoningResolvedConfig,
) -> Option<AdapterWarning> {
    let wants_text = cfg.show_reasoning_content && cfg.control_mode != ControlMode::Disabled;
    (wants_text && cap.reasoning.emits_reasoning_text == ReasoningTextEmission::ConfirmedNone)
        .then(|| {
            AdapterWarning::new(
                WarningKind::Unsupported,
                "show_reasoning_content",
                format!("{} does not return reasoning text", cap.model_id),
            )
        })
}
