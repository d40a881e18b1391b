//! Reasoning adapter behaviour for capabilities built from provider records.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use parlance::models::{build_capabilities, MaxTokensPolicy, ReasoningClass};
use parlance::reasoning::{AdapterSettings, ReasoningAdapter, WarningKind};
use parlance::types::{
    ControlMode, ReasoningDirective, ReasoningEffort, ReasoningPayload, ReasoningResolvedConfig,
};

fn capability(record: serde_json::Value) -> parlance::models::ModelGenerationCapability {
    build_capabilities(&[record]).remove(0)
}

#[test]
fn anthropic_small_budget_is_clipped_to_range_minimum() {
    let cap = capability(common::anthropic_record());
    assert_eq!(cap.reasoning.reasoning_class, ReasoningClass::A);
    assert_eq!(cap.reasoning.max_tokens_policy, MaxTokensPolicy::FixedRangeClamp);

    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::MaxTokens)
        .max_reasoning_tokens(500)
        .build();
    let outcome = ReasoningAdapter::default().adapt(&cap, &cfg);

    assert_eq!(
        outcome.payload,
        ReasoningPayload {
            reasoning: Some(ReasoningDirective::max_tokens(1024, false)),
            include_reasoning: Some(true),
            max_tokens: Some(5120),
        }
    );
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind, WarningKind::Clipped);
    assert_eq!(outcome.warnings[0].requested, Some(500));
    assert_eq!(outcome.warnings[0].applied, Some(1024));
}

#[test]
fn anthropic_effort_mode_takes_half_the_provider_cap() {
    let cap = capability(common::anthropic_record());
    let outcome = ReasoningAdapter::default().adapt(&cap, &ReasoningResolvedConfig::default());

    assert_eq!(
        outcome.payload,
        ReasoningPayload {
            reasoning: Some(ReasoningDirective::effort(ReasoningEffort::Medium, false)),
            include_reasoning: Some(true),
            max_tokens: Some(32_000),
        }
    );
    assert!(outcome.warnings.is_empty());
}

#[test]
fn hidden_reasoning_sets_exclude_and_suppresses_include() {
    let cap = capability(common::anthropic_record());
    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::MaxTokens)
        .max_reasoning_tokens(8000)
        .show_reasoning_content(false)
        .build();
    let outcome = ReasoningAdapter::default().adapt(&cap, &cfg);

    let directive = outcome.payload.reasoning.unwrap();
    assert!(directive.exclude);
    assert_eq!(directive.max_tokens_value(), Some(8000));
    assert_eq!(outcome.payload.include_reasoning, Some(false));
    assert_eq!(outcome.payload.max_tokens, Some(12_096));
}

#[test]
fn models_without_reasoning_get_no_reasoning_fields() {
    let cap = capability(common::plain_record());
    assert_eq!(cap.reasoning.reasoning_class, ReasoningClass::C);

    for mode in [ControlMode::Disabled, ControlMode::Effort, ControlMode::MaxTokens] {
        let cfg = ReasoningResolvedConfig::builder()
            .control_mode(mode)
            .max_reasoning_tokens(4000)
            .max_completion_tokens(900)
            .build();
        let outcome = ReasoningAdapter::default().adapt(&cap, &cfg);
        assert!(outcome.payload.is_empty(), "mode {mode}");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::Unsupported);
    }
}

#[test]
fn openai_budget_falls_back_to_effort_with_completion_cap() {
    let cap = capability(json!({
        "id": "openai/o3-mini",
        "name": "OpenAI: o3 Mini",
        "supported_parameters": ["reasoning", "max_tokens", "seed"],
        "top_provider": {"max_completion_tokens": 100000}
    }));
    assert_eq!(cap.reasoning.reasoning_class, ReasoningClass::B);

    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::MaxTokens)
        .effort(ReasoningEffort::High)
        .max_reasoning_tokens(20_000)
        .build();
    let outcome = ReasoningAdapter::default().adapt(&cap, &cfg);

    assert_eq!(
        outcome.payload,
        ReasoningPayload {
            reasoning: Some(ReasoningDirective::effort(ReasoningEffort::High, false)),
            include_reasoning: None,
            max_tokens: Some(20_000),
        }
    );
    assert!(outcome.has_warning(WarningKind::Fallback));
    // o-series models never stream their reasoning text.
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::Unsupported && w.field == "show_reasoning_content"));
}

#[test]
fn gemini_budget_is_limited_by_provider_cap_minus_margin() {
    let cap = capability(json!({
        "id": "google/gemini-2.5-flash",
        "supported_parameters": ["reasoning", "include_reasoning", "max_tokens"],
        "top_provider": {"max_completion_tokens": 8192}
    }));
    assert_eq!(cap.reasoning.max_tokens_policy, MaxTokensPolicy::ProviderUnknownRange);

    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::MaxTokens)
        .max_reasoning_tokens(16_000)
        .build();
    let outcome = ReasoningAdapter::default().adapt(&cap, &cfg);

    assert_eq!(
        outcome.payload.reasoning.and_then(|r| r.max_tokens_value()),
        Some(7168)
    );
    assert_eq!(outcome.payload.max_tokens, Some(8192));
    assert!(outcome.has_warning(WarningKind::Clipped));
}

#[test]
fn disabled_mode_sends_effort_none_and_excludes() {
    let cap = capability(common::anthropic_record());
    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::Disabled)
        .build();
    let outcome = ReasoningAdapter::default().adapt(&cap, &cfg);

    assert_eq!(
        outcome.payload.reasoning,
        Some(ReasoningDirective::effort(ReasoningEffort::None, true))
    );
    assert_eq!(outcome.payload.include_reasoning, Some(false));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn reversed_budget_range_is_read_low_to_high() {
    let settings: AdapterSettings =
        serde_json::from_value(json!({"budget_range": [32000, 1024]})).unwrap();
    assert_eq!(settings.budget_bounds(), (1024, 32_000));
    let adapter = ReasoningAdapter::new(settings);
    let cap = capability(common::anthropic_record());

    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::MaxTokens)
        .max_reasoning_tokens(5000)
        .build();
    let outcome = adapter.adapt(&cap, &cfg);
    assert_eq!(
        outcome.payload,
        ReasoningPayload {
            reasoning: Some(ReasoningDirective::max_tokens(5000, false)),
            include_reasoning: Some(true),
            max_tokens: Some(9096),
        }
    );
    assert!(outcome.warnings.is_empty());

    let cfg = ReasoningResolvedConfig::builder()
        .control_mode(ControlMode::MaxTokens)
        .max_reasoning_tokens(40_000)
        .build();
    let outcome = adapter.adapt(&cap, &cfg);
    assert!(outcome.has_warning(WarningKind::Clipped));
    assert_eq!(
        outcome.payload.reasoning,
        Some(ReasoningDirective::max_tokens(32_000, false))
    );
}
