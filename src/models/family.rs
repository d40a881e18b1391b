//! Model family detection.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Vendor family a model belongs to, for reasoning-policy purposes.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
pub enum ModelFamily {
    #[serde(rename = "anthropic")]
    #[strum(serialize = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini-family")]
    #[strum(serialize = "gemini-family")]
    Gemini,
    #[serde(rename = "openai-family")]
    #[strum(serialize = "openai-family")]
    OpenAi,
    #[serde(rename = "qwen-family")]
    #[strum(serialize = "qwen-family")]
    Qwen,
    #[serde(rename = "deepseek-family")]
    #[strum(serialize = "deepseek-family")]
    DeepSeek,
    #[serde(rename = "other")]
    #[strum(serialize = "other")]
    Other,
}

struct FamilyRule {
    family: ModelFamily,
    vendor_prefixes: &'static [&'static str],
    keywords: &'static str,
}

/// Ordered signature rules. Keyword matching walks this list top to bottom,
/// so more specific vendors come before ones whose names they embed
/// (e.g. `deepseek-r1-distill-qwen`).
const FAMILY_RULES: &[FamilyRule] = &[
    FamilyRule {
        family: ModelFamily::Anthropic,
        vendor_prefixes: &["anthropic/"],
        keywords: r"anthropic|claude",
    },
    FamilyRule {
        family: ModelFamily::Gemini,
        vendor_prefixes: &["google/"],
        keywords: r"gemini",
    },
    FamilyRule {
        family: ModelFamily::DeepSeek,
        vendor_prefixes: &["deepseek/"],
        keywords: r"deepseek",
    },
    FamilyRule {
        family: ModelFamily::Qwen,
        vendor_prefixes: &["qwen/", "alibaba/"],
        keywords: r"qwen|qwq",
    },
    FamilyRule {
        family: ModelFamily::OpenAi,
        vendor_prefixes: &["openai/"],
        keywords: r"openai|(?:^|[/\s:])(?:gpt-|o[1-9](?:-|$|\s))",
    },
];

fn keyword_patterns() -> &'static [(ModelFamily, Regex)] {
    static PATTERNS: OnceLock<Vec<(ModelFamily, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FAMILY_RULES
            .iter()
            .filter_map(|rule| match Regex::new(rule.keywords) {
                Ok(re) => Some((rule.family, re)),
                Err(err) => {
                    tracing::warn!(family = %rule.family, error = %err, "invalid family pattern");
                    None
                }
            })
            .collect()
    })
}

/// Detect the family of a model from its identifier and display name.
///
/// Vendor prefixes on the id win over keyword matches; no match is `Other`.
pub fn detect_family(model_id: &str, name: Option<&str>) -> ModelFamily {
    let id = model_id.trim().to_ascii_lowercase();

    for rule in FAMILY_RULES {
        if rule.vendor_prefixes.iter().any(|p| id.starts_with(p)) {
            return rule.family;
        }
    }

    let name = name.map(str::to_ascii_lowercase).unwrap_or_default();
    for (family, pattern) in keyword_patterns() {
        if pattern.is_match(&id) || pattern.is_match(&name) {
            return *family;
        }
    }

    ModelFamily::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_prefix_wins() {
        assert_eq!(
            detect_family("deepseek/deepseek-r1-distill-qwen-32b", None),
            ModelFamily::DeepSeek
        );
        assert_eq!(
            detect_family("anthropic/claude-3.7-sonnet:thinking", None),
            ModelFamily::Anthropic
        );
        assert_eq!(detect_family("qwen/qwen3-235b-a22b", None), ModelFamily::Qwen);
    }

    #[test]
    fn keyword_fallback() {
        assert_eq!(detect_family("some-host/gemini-2.5-pro", None), ModelFamily::Gemini);
        assert_eq!(detect_family("azure/o3-mini", None), ModelFamily::OpenAi);
        assert_eq!(detect_family("azure/gpt-4o", None), ModelFamily::OpenAi);
        assert_eq!(
            detect_family("vendor/x-1", Some("Anthropic: Claude via proxy")),
            ModelFamily::Anthropic
        );
    }

    #[test]
    fn unknown_is_other() {
        assert_eq!(detect_family("mistralai/mistral-large", None), ModelFamily::Other);
        assert_eq!(detect_family("meta-llama/llama-4-maverick", None), ModelFamily::Other);
    }

    #[test]
    fn family_tags() {
        assert_eq!(ModelFamily::Gemini.to_string(), "gemini-family");
        assert_eq!("qwen-family".parse::<ModelFamily>().unwrap(), ModelFamily::Qwen);
    }
}
