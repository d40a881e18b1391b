//! Model-capability store keyed by model id.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::builder::build_capabilities;
use super::capabilities::ModelGenerationCapability;
use crate::error::{ParlanceError, Result};

/// Shared, cheaply clonable capability store.
///
/// Descriptors are replaced wholesale on [`refresh`](Self::refresh); readers
/// get owned copies so a refresh never mutates a descriptor in use.
#[derive(Clone, Default, Debug)]
pub struct CapabilityRegistry {
    inner: Arc<RwLock<HashMap<String, ModelGenerationCapability>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from raw provider records.
    pub fn from_records(records: &[serde_json::Value]) -> Self {
        let registry = Self::new();
        registry.refresh(records);
        registry
    }

    /// Rebuild every descriptor from fresh provider metadata.
    ///
    /// Returns the number of descriptors now held.
    pub fn refresh(&self, records: &[serde_json::Value]) -> usize {
        let rebuilt: HashMap<_, _> = build_capabilities(records)
            .into_iter()
            .map(|cap| (cap.model_id.clone(), cap))
            .collect();
        let count = rebuilt.len();
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = rebuilt;
        count
    }

    pub fn insert(&self, capability: ModelGenerationCapability) {
        self.inner
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(capability.model_id.clone(), capability);
    }

    pub fn get(&self, model_id: &str) -> Result<ModelGenerationCapability> {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(model_id)
            .cloned()
            .ok_or_else(|| ParlanceError::ModelNotFound(model_id.to_string()))
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(model_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn refresh_replaces_previous_entries() {
        let registry = CapabilityRegistry::from_records(&[json!({"id": "a/one"})]);
        assert!(registry.contains("a/one"));

        let count = registry.refresh(&[json!({"id": "b/two"}), json!({"name": "no id"})]);
        assert_eq!(count, 1);
        assert!(!registry.contains("a/one"));
        assert!(registry.get("b/two").is_ok());
    }

    #[test]
    fn missing_model_is_not_found() {
        let registry = CapabilityRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(ParlanceError::ModelNotFound(id)) if id == "nope"
        ));
    }
}
