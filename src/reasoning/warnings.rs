//! Structured advisories produced while adapting reasoning preferences.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::ReasoningPayload;

/// Why a requested setting was altered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WarningKind {
    /// The model cannot honour the setting at all.
    Unsupported,
    /// A value was clamped into a valid range.
    Clipped,
    /// A derived value was raised or lowered to keep budgets consistent.
    AutoAdjusted,
    /// A different branch than requested was used.
    Fallback,
}

/// One non-fatal advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterWarning {
    pub kind: WarningKind,
    /// Request field the advisory concerns (`reasoning.max_tokens`, `max_tokens`, ...).
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<u64>,
}

impl AdapterWarning {
    pub fn new(kind: WarningKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
            requested: None,
            applied: None,
        }
    }

    pub fn values(self, requested: u32, applied: u32) -> Self {
        Self {
            applied: Some(u64::from(applied)),
            ..self.with_requested(requested)
        }
    }

    pub fn with_requested(self, requested: u32) -> Self {
        Self {
            requested: Some(u64::from(requested)),
            ..self
        }
    }
}

/// Payload plus the advisories explaining how it differs from the request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdapterOutcome {
    pub payload: ReasoningPayload,
    pub warnings: Vec<AdapterWarning>,
}

impl AdapterOutcome {
    pub fn new(payload: ReasoningPayload) -> Self {
        Self {
            payload,
            warnings: Vec::new(),
        }
    }

    /// Empty payload with a single advisory.
    pub fn only(warning: AdapterWarning) -> Self {
        Self {
            payload: ReasoningPayload::default(),
            warnings: vec![warning],
        }
    }

    pub fn with_warning(self, warning: AdapterWarning) -> Self {
        self.with_warnings(std::iter::once(warning))
    }

    pub fn with_warnings(self, extra: impl IntoIterator<Item = AdapterWarning>) -> Self {
        let Self { payload, warnings } = self;
        Self {
            payload,
            warnings: warnings.into_iter().chain(extra).collect(),
        }
    }

    /// Put `earlier` advisories ahead of this outcome's own.
    pub fn prepend(self, earlier: Vec<AdapterWarning>) -> Self {
        let Self { payload, warnings } = self;
        Self {
            payload,
            warnings: earlier.into_iter().chain(warnings).collect(),
        }
    }

    pub fn map_payload(self, f: impl FnOnce(ReasoningPayload) -> ReasoningPayload) -> Self {
        Self {
            payload: f(self.payload),
            warnings: self.warnings,
        }
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}
