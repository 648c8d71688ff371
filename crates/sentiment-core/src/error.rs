//! Error types for the sentiment service

/// Result type alias using the service's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sentiment operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed configuration values
    #[error("configuration error: {0}")]
    Config(String),

    /// Model could not be resolved, fetched, persisted or loaded
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Request payload missing or malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// Classifier invocation failed
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new prediction error
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Short machine-readable name, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::ModelLoad(_) => "model_load",
            Self::Validation(_) => "validation",
            Self::Prediction(_) => "prediction",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
