//! Four-layer generation-config store.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::generation::{GenerationConfig, PartialGenerationConfig};
use crate::error::{ParlanceError, Result};

/// All persisted layers below the per-request override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigLayers {
    #[serde(default)]
    pub global: PartialGenerationConfig,
    #[serde(default)]
    pub models: HashMap<String, PartialGenerationConfig>,
    #[serde(default)]
    pub conversations: HashMap<String, PartialGenerationConfig>,
}

impl ConfigLayers {
    /// Merge built-in default < global < model < conversation < request.
    pub fn resolve(
        &self,
        model_id: Option<&str>,
        conversation_id: Option<&str>,
        request: Option<&PartialGenerationConfig>,
    ) -> GenerationConfig {
        let model = model_id.and_then(|id| self.models.get(id));
        let conversation = conversation_id.and_then(|id| self.conversations.get(id));
        GenerationConfig::resolve(
            std::iter::once(&self.global)
                .chain(model)
                .chain(conversation)
                .chain(request),
        )
    }
}

/// Durable storage for config layers.
pub trait LayerPersistence: Send + Sync {
    fn load(&self) -> Result<Option<ConfigLayers>>;
    fn save(&self, layers: &ConfigLayers) -> Result<()>;
}

/// Stores layers as one JSON document.
///
/// JSON is used rather than TOML because an explicit clear is a `null`.
#[derive(Debug, Clone)]
pub struct FileLayerPersistence {
    path: PathBuf,
}

impl FileLayerPersistence {
    pub const FILE_NAME: &'static str = "generation-layers.json";

    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: base_dir.into().join(Self::FILE_NAME),
        }
    }

    pub fn new_default() -> Self {
        Self::new(super::default_config_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayerPersistence for FileLayerPersistence {
    fn load(&self) -> Result<Option<ConfigLayers>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, layers: &ConfigLayers) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(layers)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

/// Generation-config service object.
///
/// Constructed once at startup and passed by handle to every call site;
/// clones share the same layers.
#[derive(Clone, Default)]
pub struct GenerationConfigStore {
    layers: Arc<RwLock<ConfigLayers>>,
    persistence: Option<Arc<dyn LayerPersistence>>,
}

impl fmt::Debug for GenerationConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfigStore")
            .field("layers", &self.layers)
            .field("persistence", &self.persistence.as_ref().map(|_| ".."))
            .finish()
    }
}

impl GenerationConfigStore {
    /// In-memory store with no persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store backed by durable storage, loading any existing layers.
    pub fn with_persistence(persistence: Arc<dyn LayerPersistence>) -> Result<Self> {
        let layers = persistence.load()?.unwrap_or_default();
        Ok(Self {
            layers: Arc::new(RwLock::new(layers)),
            persistence: Some(persistence),
        })
    }

    /// Snapshot of all layers.
    pub fn layers(&self) -> ConfigLayers {
        self.read().clone()
    }

    pub fn global(&self) -> PartialGenerationConfig {
        self.read().global.clone()
    }

    pub fn model_layer(&self, model_id: &str) -> Option<PartialGenerationConfig> {
        self.read().models.get(model_id).cloned()
    }

    pub fn conversation_layer(&self, conversation_id: &str) -> Option<PartialGenerationConfig> {
        self.read().conversations.get(conversation_id).cloned()
    }

    pub fn set_global(&self, layer: PartialGenerationConfig) -> Result<()> {
        self.write(|layers| layers.global = layer)
    }

    pub fn set_model_layer(&self, model_id: &str, layer: PartialGenerationConfig) -> Result<()> {
        if model_id.trim().is_empty() {
            return Err(ParlanceError::InvalidArgument("empty model id".to_string()));
        }
        self.write(|layers| {
            layers.models.insert(model_id.to_string(), layer);
        })
    }

    pub fn set_conversation_layer(
        &self,
        conversation_id: &str,
        layer: PartialGenerationConfig,
    ) -> Result<()> {
        if conversation_id.trim().is_empty() {
            return Err(ParlanceError::InvalidArgument(
                "empty conversation id".to_string(),
            ));
        }
        self.write(|layers| {
            layers
                .conversations
                .insert(conversation_id.to_string(), layer);
        })
    }

    pub fn remove_model_layer(&self, model_id: &str) -> Result<()> {
        self.write(|layers| {
            layers.models.remove(model_id);
        })
    }

    pub fn remove_conversation_layer(&self, conversation_id: &str) -> Result<()> {
        self.write(|layers| {
            layers.conversations.remove(conversation_id);
        })
    }

    /// Resolve the effective configuration. Pure with respect to the store.
    pub fn resolve(
        &self,
        model_id: Option<&str>,
        conversation_id: Option<&str>,
        request: Option<&PartialGenerationConfig>,
    ) -> GenerationConfig {
        self.read().resolve(model_id, conversation_id, request)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ConfigLayers> {
        self.layers.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Apply `update` to a copy, persist it, and only then publish it.
    ///
    /// The write lock is held across the save so concurrent writers cannot
    /// interleave between persisting and publishing.
    fn write(&self, update: impl FnOnce(&mut ConfigLayers)) -> Result<()> {
        let mut guard = self.layers.write().unwrap_or_else(|p| p.into_inner());
        let mut candidate = guard.clone();
        update(&mut candidate);
        if let Some(persistence) = &self.persistence {
            persistence.save(&candidate)?;
            debug!(
                models = candidate.models.len(),
                conversations = candidate.conversations.len(),
                "persisted generation config layers"
            );
        }
        *guard = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::patch::Patch;
    use tempfile::TempDir;

    fn temperature(value: f64) -> PartialGenerationConfig {
        PartialGenerationConfig {
            temperature: Patch::Set(value),
            ..Default::default()
        }
    }

    #[test]
    fn model_layer_only_applies_to_its_model() {
        let store = GenerationConfigStore::new();
        store.set_global(temperature(0.2)).unwrap();
        store.set_model_layer("a/model", temperature(0.9)).unwrap();

        assert_eq!(store.resolve(Some("a/model"), None, None).temperature, Some(0.9));
        assert_eq!(store.resolve(Some("b/model"), None, None).temperature, Some(0.2));
        assert_eq!(store.resolve(None, None, None).temperature, Some(0.2));
    }

    #[test]
    fn layers_survive_reload() {
        let dir = TempDir::new().unwrap();
        let persistence = Arc::new(FileLayerPersistence::new(dir.path()));
        let store = GenerationConfigStore::with_persistence(persistence.clone()).unwrap();
        store
            .set_conversation_layer(
                "conv-1",
                PartialGenerationConfig {
                    temperature: Patch::Clear,
                    ..Default::default()
                },
            )
            .unwrap();

        let reloaded = GenerationConfigStore::with_persistence(persistence).unwrap();
        assert_eq!(
            reloaded.conversation_layer("conv-1").unwrap().temperature,
            Patch::Clear
        );
    }

    struct FailingPersistence;

    impl LayerPersistence for FailingPersistence {
        fn load(&self) -> Result<Option<ConfigLayers>> {
            Ok(None)
        }

        fn save(&self, _layers: &ConfigLayers) -> Result<()> {
            Err(ParlanceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn failed_save_leaves_layers_unchanged() {
        let store = GenerationConfigStore::with_persistence(Arc::new(FailingPersistence)).unwrap();

        let err = store.set_global(temperature(0.9)).unwrap_err();
        assert!(matches!(err, ParlanceError::Io(_)));
        assert_eq!(store.resolve(None, None, None).temperature, None);
        assert!(store.set_model_layer("a/model", temperature(0.5)).is_err());
        assert!(store.model_layer("a/model").is_none());
        assert_eq!(store.layers(), ConfigLayers::default());
    }

    #[test]
    fn empty_ids_are_rejected() {
        let store = GenerationConfigStore::new();
        assert!(store.set_model_layer(" ", temperature(1.0)).is_err());
        assert!(store.set_conversation_layer("", temperature(1.0)).is_err());
    }
}
