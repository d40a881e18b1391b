//! Completion-budget strategies.

use serde::{Deserialize, Serialize};

/// Picks the top-level completion budget when no numeric reasoning budget
/// constrains it.
///
/// Order: user override, then `ratio × provider cap`, then a fixed constant,
/// else unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionBudgetStrategy {
    /// Fraction of the provider-reported cap, in `(0, 1]`.
    pub provider_cap_ratio: Option<f64>,
    pub fixed_tokens: Option<u32>,
}

impl Default for CompletionBudgetStrategy {
    fn default() -> Self {
        Self {
            provider_cap_ratio: Some(0.5),
            fixed_tokens: None,
        }
    }
}

impl CompletionBudgetStrategy {
    pub fn resolve(&self, user_override: Option<u32>, provider_cap: Option<u32>) -> Option<u32> {
        user_override
            .or_else(|| {
                let ratio = self
                    .provider_cap_ratio
                    .filter(|r| r.is_finite() && *r > 0.0 && *r <= 1.0)?;
                let cap = provider_cap?;
                Some(((f64::from(cap) * ratio).floor() as u32).max(1))
            })
            .or(self.fixed_tokens)
    }
}

/// How the completion budget is derived from a clamped reasoning budget
/// under the fixed-range policy. The result must exceed the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RangeCompletionStrategy {
    /// `budget + gap`.
    FixedGap(u32),
    /// `ceil(budget × factor)`.
    Multiple(f64),
}

impl Default for RangeCompletionStrategy {
    fn default() -> Self {
        Self::FixedGap(4096)
    }
}

impl RangeCompletionStrategy {
    pub fn completion_for(&self, budget: u32) -> u32 {
        match *self {
            Self::FixedGap(gap) => budget.saturating_add(gap),
            Self::Multiple(factor) if factor.is_finite() && factor > 0.0 => {
                let scaled = (f64::from(budget) * factor).ceil();
                if scaled >= f64::from(u32::MAX) {
                    u32::MAX
                } else {
                    scaled as u32
                }
            }
            Self::Multiple(_) => budget,
        }
    }
}
