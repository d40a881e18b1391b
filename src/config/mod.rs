//! Configuration: provider connection settings and layered generation config.
//!
//! Provider settings resolve as explicit values > environment > settings file.

pub mod generation;
pub mod patch;
pub mod store;

pub use generation::{
    GenerationConfig, ImageConfig, PartialGenerationConfig, PartialImageConfig,
    PartialReasoningConfig,
};
pub use patch::{Overlay, Patch};
pub use store::{ConfigLayers, FileLayerPersistence, GenerationConfigStore, LayerPersistence};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ParlanceError, Result};
use crate::stream::DEFAULT_MAX_LINE_BYTES;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider name reported in results.
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Ceiling for one unterminated stream line.
    pub max_line_bytes: usize,
    /// Attempts to open the stream, including the first.
    pub max_attempts: u32,
    /// Sent as `HTTP-Referer` for app attribution.
    pub app_url: Option<String>,
    /// Sent as `X-Title` for app attribution.
    pub app_title: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("max_line_bytes", &self.max_line_bytes)
            .field("max_attempts", &self.max_attempts)
            .field("app_url", &self.app_url)
            .field("app_title", &self.app_title)
            .finish()
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: "openrouter".to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 15,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            max_attempts: 3,
            app_url: None,
            app_title: None,
        }
    }
}

impl ProviderSettings {
    /// Defaults with an explicit key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ParlanceError::Configuration(e.to_string()))
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Load `settings.toml` from the default directory (if present), then
    /// apply environment overrides (`.env` is honoured).
    pub fn load() -> Result<Self> {
        let path = default_config_dir().join("settings.toml");
        let settings = match std::fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(settings.with_env_overrides())
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("OPENROUTER_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Some(bytes) = std::env::var("PARLANCE_MAX_LINE_BYTES")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            self.max_line_bytes = bytes;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Chat-completions endpoint URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ParlanceError::Configuration("Missing OPENROUTER_API_KEY".into()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_line_bytes == 0 {
            return Err(ParlanceError::Configuration(
                "max_line_bytes must be positive".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ParlanceError::Configuration(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `~/.parlance`, or `.parlance` when no home directory is known.
pub fn default_config_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".parlance"))
        .unwrap_or_else(|| PathBuf::from(".parlance"))
}
