//! Shared prediction types

use serde::{Deserialize, Serialize};

/// Label returned when there is no text to classify
pub const NEUTRAL_LABEL: &str = "neutral";

/// Confidence returned alongside [`NEUTRAL_LABEL`]
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Task type reported in model metadata
pub const MODEL_TYPE: &str = "sentiment-analysis";

/// A single sentiment prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Lower-cased sentiment label
    pub sentiment: String,

    /// Confidence in the label (0.0-1.0)
    pub confidence: f64,
}

impl Prediction {
    pub fn new(sentiment: impl Into<String>, confidence: f64) -> Self {
        Self {
            sentiment: sentiment.into(),
            confidence,
        }
    }

    /// The fixed result for empty input
    pub fn neutral() -> Self {
        Self::new(NEUTRAL_LABEL, NEUTRAL_CONFIDENCE)
    }
}

/// Metadata describing the model bound to a predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier, e.g. a Hugging Face repo id
    pub name: String,

    /// Model version the service was started with
    pub version: String,

    /// Task type, always `sentiment-analysis`
    #[serde(rename = "type")]
    pub model_type: String,

    /// Backend that runs inference
    pub backend: String,

    /// Where the model came from on this start (`local` or `remote`)
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_prediction() {
        let prediction = Prediction::neutral();
        assert_eq!(prediction.sentiment, "neutral");
        assert_eq!(prediction.confidence, 0.5);
    }

    #[test]
    fn test_model_info_serializes_type_field() {
        let info = ModelInfo {
            name: "distilbert".to_string(),
            version: "1.0.0".to_string(),
            model_type: MODEL_TYPE.to_string(),
            backend: "distilbert".to_string(),
            source: "local".to_string(),
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], "sentiment-analysis");
        assert!(value.get("model_type").is_none());
    }
}
