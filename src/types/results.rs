//! Generation result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stream::{ReasoningDetail, ReasoningSummary};
use super::usage::Usage;
use crate::reasoning::AdapterWarning;

/// Immutable result of one streamed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub generation_id: Uuid,
    /// Full concatenated text.
    pub text: String,
    /// Image references in first-seen order, deduplicated.
    pub images: Vec<String>,
    pub usage: Option<Usage>,
    pub reasoning: Option<ReasoningSummary>,
    /// Structured reasoning records, deduplicated.
    pub reasoning_details: Vec<ReasoningDetail>,
    pub provider: String,
    pub model: String,
    /// Places where the requested configuration was altered before sending.
    pub warnings: Vec<AdapterWarning>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AggregationResult {
    pub fn has_reasoning(&self) -> bool {
        self.reasoning
            .as_ref()
            .map(|r| !r.text.is_empty() || !r.summary.is_empty() || r.detail_count > 0)
            .unwrap_or(false)
    }
}
