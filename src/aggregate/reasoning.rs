//! Reasoning accumulation and final visibility resolution.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::types::{
    ControlMode, ReasoningDetail, ReasoningDetailKind, ReasoningEffort, ReasoningPayload,
    ReasoningResolvedConfig, ReasoningSummary, ReasoningVisibility,
};

/// Collects free-running reasoning text and structured details.
#[derive(Debug, Clone, Default)]
pub struct ReasoningAccumulator {
    text: String,
    details: Vec<ReasoningDetail>,
    seen: HashSet<String>,
    injected: Option<ReasoningSummary>,
}

impl ReasoningAccumulator {
    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Keep a detail unless one with the same identity was already seen.
    ///
    /// Identity is the detail id, or a content fingerprint when it has none.
    pub fn push_detail(&mut self, detail: &ReasoningDetail) -> bool {
        if !self.seen.insert(detail_key(detail)) {
            return false;
        }
        self.details.push(detail.clone());
        true
    }

    /// Record a summary produced upstream (e.g. by a non-wire provider).
    pub fn inject_summary(&mut self, summary: ReasoningSummary) {
        self.injected = Some(summary);
    }

    pub fn has_evidence(&self) -> bool {
        !self.text.is_empty() || !self.details.is_empty() || self.injected.is_some()
    }

    pub fn details(&self) -> &[ReasoningDetail] {
        &self.details
    }

    pub fn into_details(self) -> Vec<ReasoningDetail> {
        self.details
    }

    /// Resolve the final summary.
    ///
    /// Each attribute is taken from the explicit preference first, then the
    /// payload that was sent, then accumulated evidence. Returns `None` when
    /// reasoning was neither requested nor observed.
    pub fn summarize(
        &self,
        preference: Option<&ReasoningResolvedConfig>,
        sent: Option<&ReasoningPayload>,
        provider: &str,
        model: &str,
    ) -> Option<ReasoningSummary> {
        let directive = sent.and_then(|p| p.reasoning);
        let injected = self.injected.as_ref();

        let requested = preference
            .map(|cfg| cfg.control_mode != ControlMode::Disabled)
            .or_else(|| directive.map(|d| d.effort_level() != Some(ReasoningEffort::None)))
            .unwrap_or(false);
        if !requested && !self.has_evidence() {
            return None;
        }

        let explicit_excluded = preference
            .map(|cfg| !cfg.show_reasoning_content || cfg.control_mode == ControlMode::Disabled)
            .or_else(|| directive.map(|d| d.exclude));
        let excluded = explicit_excluded
            .or_else(|| injected.map(|s| s.excluded))
            .unwrap_or(false);

        let effort = preference
            .filter(|cfg| cfg.control_mode == ControlMode::Effort)
            .map(|cfg| cfg.effort)
            .or_else(|| directive.and_then(|d| d.effort_level()))
            .or_else(|| injected.and_then(|s| s.effort));
        let max_tokens = preference
            .filter(|cfg| cfg.control_mode == ControlMode::MaxTokens)
            .and_then(|cfg| cfg.max_reasoning_tokens)
            .or_else(|| directive.and_then(|d| d.max_tokens_value()))
            .or_else(|| injected.and_then(|s| s.max_tokens));

        let observed = !self.text.is_empty() || !self.details.is_empty();
        let visibility = match (explicit_excluded, injected) {
            (None, Some(summary)) if !observed => summary.visibility,
            _ if excluded => ReasoningVisibility::Hidden,
            _ if self.has_evidence() => ReasoningVisibility::Visible,
            _ => ReasoningVisibility::Omitted,
        };

        Some(ReasoningSummary {
            summary: self.summary_text(),
            text: self.full_text(),
            detail_count: self.details.len(),
            visibility,
            effort,
            max_tokens,
            provider: provider.to_string(),
            model: model.to_string(),
            excluded,
        })
    }

    fn full_text(&self) -> String {
        if !self.text.is_empty() {
            return self.text.clone();
        }
        let from_details: String = self
            .details
            .iter()
            .filter(|d| d.kind == ReasoningDetailKind::Text)
            .filter_map(|d| d.text.as_deref())
            .collect();
        if from_details.is_empty() {
            self.injected
                .as_ref()
                .map(|s| s.text.clone())
                .unwrap_or_default()
        } else {
            from_details
        }
    }

    fn summary_text(&self) -> String {
        if let Some(summary) = self.injected.as_ref().filter(|s| !s.summary.is_empty()) {
            return summary.summary.clone();
        }
        self.details
            .iter()
            .filter_map(|d| d.summary.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn detail_key(detail: &ReasoningDetail) -> String {
    if let Some(id) = detail.id.as_deref().filter(|id| !id.is_empty()) {
        return format!("id:{id}");
    }
    let mut hasher = Sha256::new();
    for part in [
        Some(detail.kind.to_string()),
        detail.text.clone(),
        detail.summary.clone(),
        detail.data.clone(),
        detail.format.clone(),
        detail.index.map(|i| i.to_string()),
    ] {
        hasher.update(part.as_deref().unwrap_or("").as_bytes());
        hasher.update([0u8]);
    }
    format!("sha256:{:x}", hasher.finalize())
}
