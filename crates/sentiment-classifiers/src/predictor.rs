//! Sentiment prediction over a loaded classifier

use crate::classifier::Classifier;
use crate::model_loader::LoadedModel;
use crate::sanitize::sanitize;
use sentiment_core::{Error, ModelInfo, Prediction, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Number of characters of input echoed in prediction logs
const LOG_PREVIEW_CHARS: usize = 20;

/// Runs sanitized text through a classifier bound to one model version.
///
/// At most `max_concurrency` classifications run at once; additional callers
/// wait for a permit.
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    info: ModelInfo,
    permits: Semaphore,
    max_concurrency: usize,
}

impl Predictor {
    /// Create a predictor allowing one concurrent inference per CPU
    pub fn new(classifier: Arc<dyn Classifier>, info: ModelInfo) -> Self {
        let max_concurrency = num_cpus::get().max(1);
        Self {
            classifier,
            info,
            permits: Semaphore::new(max_concurrency),
            max_concurrency,
        }
    }

    /// Create a predictor for a model produced by the loader
    pub fn from_loaded(model: LoadedModel) -> Self {
        let info = model.info();
        Self::new(model.classifier, info)
    }

    /// Limit the number of concurrent classifications
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        self.permits = Semaphore::new(max_concurrency);
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Version of the model every prediction is produced with
    pub fn model_version(&self) -> &str {
        &self.info.version
    }

    pub fn model_info(&self) -> &ModelInfo {
        &self.info
    }

    /// Predict the sentiment of `text`.
    ///
    /// Text that is empty after sanitation yields `("neutral", 0.5)` without
    /// calling the classifier.
    pub async fn predict(&self, text: &str) -> Result<Prediction> {
        let sanitized = sanitize(text);
        if sanitized.is_empty() {
            tracing::debug!("Empty input, returning neutral prediction");
            return Ok(Prediction::neutral());
        }

        let result = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| Error::prediction("Predictor is closed"))?;

            self.classifier
                .classify(&sanitized)
                .await
                .map_err(|e| match e {
                    Error::Prediction(_) => e,
                    other => Error::prediction(other.to_string()),
                })?
        };

        if !result.score.is_finite() {
            return Err(Error::prediction(format!(
                "Classifier '{}' returned a non-finite score",
                self.classifier.name()
            )));
        }

        let prediction = Prediction::new(
            result.label.to_lowercase(),
            f64::from(result.score).clamp(0.0, 1.0),
        );

        metrics::histogram!("sentiment_inference_latency_us").record(result.latency_us as f64);
        metrics::counter!(
            "sentiment_predictions_total",
            "sentiment" => prediction.sentiment.clone()
        )
        .increment(1);

        log_prediction(text, &prediction, &self.info.version);
        Ok(prediction)
    }
}

fn log_prediction(text: &str, prediction: &Prediction, model_version: &str) {
    let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    tracing::info!(
        "Prediction: '{}...' -> {} (confidence: {:.4}, model: v{})",
        preview,
        prediction.sentiment,
        prediction.confidence,
        model_version
    );
}
