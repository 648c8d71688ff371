//! Sentiment Classifiers
//!
//! Everything between a resolved configuration and a prediction:
//! - Model settings from the environment
//! - On-disk model store with a Hugging Face Hub fallback for cold starts
//! - Text sanitation
//! - Classifier backends (DistilBERT via Candle, keyword lexicon)
//! - The predictor that ties them together
//!
//! Model loading blocks and is meant to run once, before serving traffic.

pub mod classifier;
#[cfg(feature = "ml-models")]
pub mod distilbert;
pub mod lexicon;
pub mod model_config;
pub mod model_loader;
pub mod predictor;
pub mod sanitize;

pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
#[cfg(feature = "ml-models")]
pub use distilbert::DistilBertClassifier;
pub use lexicon::{Lexicon, LexiconClassifier};
pub use model_config::{ModelBackend, ModelConfig};
pub use model_loader::{
    model_dir, ArtifactFiles, BundledLexiconFetcher, FetchRequest, HfHubFetcher, LoadedModel,
    ModelFetcher, ModelLoader, ModelResolution, ModelStore,
};
pub use predictor::Predictor;
pub use sanitize::{sanitize, MAX_TEXT_LENGTH};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::model_config::{ModelBackend, ModelConfig};
    pub use crate::model_loader::{LoadedModel, ModelLoader, ModelResolution, ModelStore};
    pub use crate::predictor::Predictor;
    pub use crate::sanitize::sanitize;
}
