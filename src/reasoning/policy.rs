//! Branches of the reasoning adapter.
//!
//! Each branch is a pure function from (capability, config) to an outcome;
//! the dispatcher composes them.

use super::budget::{CompletionBudgetStrategy, RangeCompletionStrategy};
use super::warnings::{AdapterOutcome, AdapterWarning, WarningKind};
use super::AdapterSettings;
use crate::models::{ModelFamily, ModelGenerationCapability};
use crate::types::{ReasoningDirective, ReasoningEffort, ReasoningPayload, ReasoningResolvedConfig};

const REASONING_BUDGET: &str = "reasoning.max_tokens";
const COMPLETION_BUDGET: &str = "max_tokens";

pub(crate) fn unsupported(cap: &ModelGenerationCapability) -> AdapterOutcome {
    AdapterOutcome::only(AdapterWarning::new(
        WarningKind::Unsupported,
        "reasoning",
        format!("{} does not accept reasoning controls", cap.model_id),
    ))
}

pub(crate) fn disabled(cfg: &ReasoningResolvedConfig) -> AdapterOutcome {
    AdapterOutcome::new(ReasoningPayload {
        reasoning: Some(ReasoningDirective::effort(ReasoningEffort::None, true)),
        include_reasoning: None,
        max_tokens: cfg.max_completion_tokens,
    })
}

pub(crate) fn effort(
    cap: &ModelGenerationCapability,
    cfg: &ReasoningResolvedConfig,
    strategy: &CompletionBudgetStrategy,
) -> AdapterOutcome {
    AdapterOutcome::new(ReasoningPayload {
        reasoning: Some(ReasoningDirective::effort(cfg.effort, !cfg.show_reasoning_content)),
        include_reasoning: None,
        max_tokens: strategy.resolve(cfg.max_completion_tokens, cap.max_completion_tokens),
    })
}

/// `max_tokens` mode without a usable number.
pub(crate) fn missing_budget(
    cap: &ModelGenerationCapability,
    cfg: &ReasoningResolvedConfig,
    strategy: &CompletionBudgetStrategy,
) -> AdapterOutcome {
    effort(cap, cfg, strategy).prepend(vec![AdapterWarning::new(
        WarningKind::Fallback,
        REASONING_BUDGET,
        format!(
            "no reasoning token budget configured; using effort '{}' instead",
            cfg.effort
        ),
    )])
}

pub(crate) fn fixed_range_clamp(
    cap: &ModelGenerationCapability,
    cfg: &ReasoningResolvedConfig,
    requested: u32,
    settings: &AdapterSettings,
) -> AdapterOutcome {
    if cap.reasoning.family != ModelFamily::Anthropic {
        return provider_unknown_range(cap, cfg, requested, settings.safety_margin).prepend(vec![
            AdapterWarning::new(
                WarningKind::Fallback,
                REASONING_BUDGET,
                format!(
                    "fixed budget range does not apply to the {} family; using provider limits",
                    cap.reasoning.family
                ),
            ),
        ]);
    }

    let (min, max) = settings.budget_bounds();
    let clamped = requested.clamp(min, max);
    let mut warnings = Vec::new();
    if clamped != requested {
        warnings.push(
            AdapterWarning::new(
                WarningKind::Clipped,
                REASONING_BUDGET,
                format!("reasoning budget must be within [{min}, {max}]"),
            )
            .values(requested, clamped),
        );
    }

    let candidate = completion_candidate(cfg.max_completion_tokens, clamped, &settings.range_completion);
    let provider_cap = cap.max_completion_tokens;
    let bounded = bound_by(candidate, provider_cap);
    if bounded > clamped {
        return AdapterOutcome::new(budget_payload(cfg, clamped, bounded)).with_warnings(warnings);
    }

    let gap = settings.auto_adjust_gap.max(1);
    let raised = bound_by(clamped.saturating_add(gap), provider_cap);
    if raised > clamped {
        warnings.push(
            AdapterWarning::new(
                WarningKind::AutoAdjusted,
                COMPLETION_BUDGET,
                "completion budget raised above the reasoning budget",
            )
            .values(bounded, raised),
        );
        return AdapterOutcome::new(budget_payload(cfg, clamped, raised)).with_warnings(warnings);
    }

    // The provider cap itself does not exceed the clamped budget.
    match provider_cap {
        Some(limit) if limit > min => {
            let lowered = limit.saturating_sub(gap).max(min);
            warnings.push(
                AdapterWarning::new(
                    WarningKind::AutoAdjusted,
                    REASONING_BUDGET,
                    format!("reasoning budget lowered below the provider cap of {limit}"),
                )
                .values(clamped, lowered),
            );
            warnings.push(
                AdapterWarning::new(
                    WarningKind::AutoAdjusted,
                    COMPLETION_BUDGET,
                    "completion budget set to the provider cap",
                )
                .values(bounded, limit),
            );
            AdapterOutcome::new(budget_payload(cfg, lowered, limit)).with_warnings(warnings)
        }
        _ => {
            let completion = clamped.saturating_add(gap);
            warnings.push(
                AdapterWarning::new(
                    WarningKind::AutoAdjusted,
                    COMPLETION_BUDGET,
                    "provider cap is below the minimum reasoning budget; completion budget exceeds it",
                )
                .values(bounded, completion),
            );
            AdapterOutcome::new(budget_payload(cfg, clamped, completion)).with_warnings(warnings)
        }
    }
}

pub(crate) fn provider_unknown_range(
    cap: &ModelGenerationCapability,
    cfg: &ReasoningResolvedConfig,
    requested: u32,
    safety_margin: u32,
) -> AdapterOutcome {
    let budget = match cap.max_completion_tokens {
        Some(limit) => requested.min(limit.saturating_sub(safety_margin).max(1)),
        None => requested,
    };
    let payload = ReasoningPayload {
        reasoning: Some(ReasoningDirective::max_tokens(budget, !cfg.show_reasoning_content)),
        include_reasoning: None,
        max_tokens: cfg.max_completion_tokens.or(cap.max_completion_tokens),
    };
    let outcome = AdapterOutcome::new(payload);
    if budget == requested {
        return outcome;
    }
    outcome.with_warning(
        AdapterWarning::new(
            WarningKind::Clipped,
            REASONING_BUDGET,
            format!(
                "reasoning budget limited to the provider cap minus {safety_margin} tokens"
            ),
        )
        .values(requested, budget),
    )
}

pub(crate) fn effort_only(
    cap: &ModelGenerationCapability,
    cfg: &ReasoningResolvedConfig,
    requested: u32,
) -> AdapterOutcome {
    let basis = cfg.max_completion_tokens.unwrap_or(requested);
    let completion = bound_by(basis, cap.max_completion_tokens);
    let payload = ReasoningPayload {
        reasoning: Some(ReasoningDirective::effort(cfg.effort, !cfg.show_reasoning_content)),
        include_reasoning: None,
        max_tokens: Some(completion),
    };
    let outcome = AdapterOutcome::new(payload).with_warning(
        AdapterWarning::new(
            WarningKind::Fallback,
            REASONING_BUDGET,
            format!(
                "token budgets are provider-defined for {}; sent effort '{}' with a completion cap instead",
                cap.model_id, cfg.effort
            ),
        )
        .with_requested(requested),
    );
    if completion == basis {
        return outcome;
    }
    outcome.with_warning(
        AdapterWarning::new(
            WarningKind::Clipped,
            COMPLETION_BUDGET,
            "completion budget limited to the provider cap",
        )
        .values(basis, completion),
    )
}

fn completion_candidate(
    user_override: Option<u32>,
    clamped: u32,
    strategy: &RangeCompletionStrategy,
) -> u32 {
    match user_override {
        Some(user) if user > clamped => user,
        _ => strategy.completion_for(clamped),
    }
}

fn bound_by(value: u32, cap: Option<u32>) -> u32 {
    cap.map_or(value, |limit| value.min(limit))
}

fn budget_payload(cfg: &ReasoningResolvedConfig, budget: u32, completion: u32) -> ReasoningPayload {
    ReasoningPayload {
        reasoning: Some(ReasoningDirective::max_tokens(budget, !cfg.show_reasoning_content)),
        include_reasoning: None,
        max_tokens: Some(completion),
    }
}
