//! Canonical streaming chunk types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::reasoning::ReasoningEffort;
use super::usage::Usage;

/// One canonical unit of streamed response data.
///
/// Exactly one semantic payload per chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    Text { content: String },
    /// Data URI or remote URL.
    Image { content: String },
    ReasoningDetail(ReasoningDetail),
    ReasoningStreamText { text: String },
    ReasoningSummary(ReasoningSummary),
    Usage(Usage),
    Error(StreamError),
}

impl StreamChunk {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn image(content: impl Into<String>) -> Self {
        Self::Image {
            content: content.into(),
        }
    }

    pub fn reasoning_text(text: impl Into<String>) -> Self {
        Self::ReasoningStreamText { text: text.into() }
    }

    pub fn error(message: impl Into<String>, code: Option<String>) -> Self {
        Self::Error(StreamError {
            message: message.into(),
            code,
        })
    }
}

/// Kind of a structured reasoning record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum ReasoningDetailKind {
    #[serde(rename = "reasoning.text")]
    #[strum(serialize = "reasoning.text")]
    Text,
    #[serde(rename = "reasoning.summary")]
    #[strum(serialize = "reasoning.summary")]
    Summary,
    #[serde(rename = "reasoning.encrypted")]
    #[strum(serialize = "reasoning.encrypted")]
    Encrypted,
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

/// Structured reasoning record, as streamed in `reasoning_details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: ReasoningDetailKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Final visibility of the reasoning channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReasoningVisibility {
    /// Reasoning content is shown to the user.
    Visible,
    /// Reasoning was requested or produced but is hidden.
    Hidden,
    /// No reasoning was involved in the generation.
    Omitted,
}

/// Resolved description of the reasoning that accompanied a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningSummary {
    pub summary: String,
    pub text: String,
    pub detail_count: usize,
    pub visibility: ReasoningVisibility,
    pub effort: Option<ReasoningEffort>,
    pub max_tokens: Option<u32>,
    pub provider: String,
    pub model: String,
    pub excluded: bool,
}

/// In-band error reported on an otherwise successful stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Output of the stream parser for one complete line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    Chunk(StreamChunk),
    /// The sentinel termination token was seen.
    Done,
}
