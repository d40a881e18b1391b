//! Token usage and cost counters reported by a provider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Token/cost counters for one generation.
///
/// Providers report heterogeneous usage objects, so counters are kept as a
/// flat map. Nested objects are flattened with dotted keys
/// (`completion_tokens_details.reasoning_tokens`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Usage {
    pub fields: BTreeMap<String, Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Usage {
    /// Build from a wire usage object. Non-numeric leaves are ignored.
    pub fn from_wire(value: &serde_json::Map<String, Value>, request_id: Option<String>) -> Self {
        let mut fields = BTreeMap::new();
        flatten_into(&mut fields, None, value);
        Self { fields, request_id }
    }

    /// Merge a later usage report into this one.
    ///
    /// Later values overwrite earlier ones for the same key; keys from both
    /// reports are kept.
    pub fn merge(&mut self, other: &Usage) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
        if other.request_id.is_some() {
            self.request_id = other.request_id.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Integer counter by key.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(|n| {
            n.as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        })
    }

    pub fn prompt_tokens(&self) -> Option<u64> {
        self.get_u64("prompt_tokens")
    }

    pub fn completion_tokens(&self) -> Option<u64> {
        self.get_u64("completion_tokens")
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.get_u64("total_tokens").or_else(|| {
            self.prompt_tokens()?
                .checked_add(self.completion_tokens()?)
        })
    }

    pub fn reasoning_tokens(&self) -> Option<u64> {
        self.get_u64("completion_tokens_details.reasoning_tokens")
            .or_else(|| self.get_u64("reasoning_tokens"))
    }

    pub fn cached_tokens(&self) -> Option<u64> {
        self.get_u64("prompt_tokens_details.cached_tokens")
    }

    /// Billed cost in credits, when the provider reports it.
    pub fn cost(&self) -> Option<f64> {
        self.fields.get("cost").and_then(Number::as_f64)
    }
}

fn flatten_into(
    out: &mut BTreeMap<String, Number>,
    prefix: Option<&str>,
    value: &serde_json::Map<String, Value>,
) {
    for (key, value) in value {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Number(n) => {
                out.insert(path, n.clone());
            }
            Value::Object(nested) => flatten_into(out, Some(&path), nested),
            _ => {}
        }
    }
}
