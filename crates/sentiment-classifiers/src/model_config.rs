//! Model settings resolved from the process environment

use config::{Config, Environment};
use sentiment_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Environment variables read by [`ModelConfig::from_env`], lower-cased.
const ENV_KEYS: [&str; 7] = [
    "model_name",
    "model_version",
    "models_dir",
    "service_name",
    "model_revision",
    "model_backend",
    "model_device",
];

/// Immutable settings describing which model to serve and where to keep it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Remote model identifier (Hugging Face repo id)
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Version tag the service reports and stores the model under
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// Root directory for persisted models
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Service name used in logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Remote revision fetched on a cold start
    #[serde(default = "default_revision")]
    pub model_revision: String,

    /// Inference backend
    #[serde(default)]
    pub model_backend: ModelBackend,

    /// Device to run inference on (cpu, cuda, metal)
    #[serde(rename = "model_device", default = "default_device")]
    pub device: String,
}

/// Inference backend used to build the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// DistilBERT sequence classification via Candle
    #[default]
    DistilBert,
    /// Keyword lexicon, no ML runtime required
    Lexicon,
}

impl ModelBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DistilBert => "distilbert",
            Self::Lexicon => "lexicon",
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_model_name() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_model_version() -> String {
    "1.0.0".to_string()
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_service_name() -> String {
    "sentiment-analysis-service".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            model_version: default_model_version(),
            models_dir: default_models_dir(),
            service_name: default_service_name(),
            model_revision: default_revision(),
            model_backend: ModelBackend::default(),
            device: default_device(),
        }
    }
}

impl ModelConfig {
    /// Resolve settings from the process environment.
    ///
    /// Absent variables fall back to defaults; only malformed values fail.
    pub fn from_env() -> Result<Self> {
        Self::from_env_map(std::env::vars().collect())
    }

    /// Resolve settings from an explicit variable map
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .filter(|(key, _)| ENV_KEYS.contains(&key.as_str()))
            .collect();

        let settings = Config::builder()
            .add_source(Environment::default().source(Some(vars)))
            .build()
            .map_err(|e| Error::config(format!("Failed to read environment: {}", e)))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::config(format!("Invalid model settings: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(Error::config("MODEL_NAME must not be empty"));
        }
        if self.model_version.trim().is_empty() {
            return Err(Error::config("MODEL_VERSION must not be empty"));
        }
        if self.model_version.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "MODEL_VERSION must not contain path separators: {}",
                self.model_version
            )));
        }
        Ok(())
    }

    /// Set the model name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Set the model version
    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    /// Set the storage root
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Set the backend
    pub fn with_backend(mut self, backend: ModelBackend) -> Self {
        self.model_backend = backend;
        self
    }
}
