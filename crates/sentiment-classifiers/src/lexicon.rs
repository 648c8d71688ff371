//! Lightweight keyword sentiment classifier
//!
//! Scores text by counting positive and negative keywords. Word lists are
//! persisted as `lexicon.json` inside the model directory, so this backend
//! goes through the same resolve/fetch/persist cycle as the neural one.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use aho_corasick::{AhoCorasick, MatchKind};
use sentiment_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Artifact file holding the word lists
pub const LEXICON_FILE: &str = "lexicon.json";

/// Positive and negative keyword lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let positive = [
            "good",
            "great",
            "excellent",
            "love",
            "amazing",
            "wonderful",
            "happy",
            "fantastic",
            "awesome",
            "best",
        ];
        let negative = [
            "bad",
            "terrible",
            "awful",
            "hate",
            "horrible",
            "worst",
            "sad",
            "angry",
            "disappointed",
            "poor",
        ];

        Self {
            positive: positive.iter().map(|w| w.to_string()).collect(),
            negative: negative.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Lexicon {
    /// Read `lexicon.json` from a model directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(LEXICON_FILE);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            Error::model_load(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| Error::model_load(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Write `lexicon.json` into a model directory
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(LEXICON_FILE), contents)?;
        Ok(())
    }
}

pub struct LexiconClassifier {
    name: String,
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl LexiconClassifier {
    pub fn new(name: impl Into<String>, lexicon: &Lexicon) -> Result<Self> {
        if lexicon.positive.is_empty() || lexicon.negative.is_empty() {
            return Err(Error::model_load(
                "Lexicon needs at least one positive and one negative keyword",
            ));
        }

        let positive = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&lexicon.positive)
            .map_err(|e| {
                Error::model_load(format!("Failed to build positive sentiment matcher: {e}"))
            })?;

        let negative = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&lexicon.negative)
            .map_err(|e| {
                Error::model_load(format!("Failed to build negative sentiment matcher: {e}"))
            })?;

        Ok(Self {
            name: name.into(),
            positive,
            negative,
        })
    }

    /// Build from the `lexicon.json` stored in `dir`
    pub fn from_dir(name: impl Into<String>, dir: &Path) -> Result<Self> {
        let lexicon = Lexicon::from_dir(dir)?;
        Self::new(name, &lexicon)
    }
}

#[async_trait::async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let positive_hits = count_words(&self.positive, text) as f32;
        let negative_hits = count_words(&self.negative, text) as f32;
        let total = positive_hits + negative_hits;

        let positive = if total == 0.0 {
            0.5
        } else {
            positive_hits / total
        };
        let (label, score) = if positive >= 0.5 {
            ("positive", positive)
        } else {
            ("negative", 1.0 - positive)
        };

        Ok(ClassificationResult {
            label: label.to_string(),
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(vec![
                    ("negative".to_string(), 1.0 - positive),
                    ("positive".to_string(), positive),
                ]),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Count keyword matches that are whole words in `text`
fn count_words(matcher: &AhoCorasick, text: &str) -> usize {
    matcher
        .find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })
        .count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LexiconClassifier {
        LexiconClassifier::new("lexicon", &Lexicon::default()).unwrap()
    }

    #[tokio::test]
    async fn test_positive_text() {
        let result = classifier()
            .classify("I love this product, it's amazing!")
            .await
            .unwrap();
        assert_eq!(result.label, "positive");
        assert_eq!(result.score, 1.0);
    }

    #[tokio::test]
    async fn test_negative_text() {
        let result = classifier()
            .classify("This is terrible, I hate it.")
            .await
            .unwrap();
        assert_eq!(result.label, "negative");
        assert_eq!(result.score, 1.0);
    }

    #[tokio::test]
    async fn test_mixed_text_scores_majority() {
        let result = classifier()
            .classify("Great screen, awesome speakers, bad battery")
            .await
            .unwrap();
        assert_eq!(result.label, "positive");
        assert!((result.score - 2.0 / 3.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_no_keywords_is_even() {
        let result = classifier().classify("The package arrived.").await.unwrap();
        assert_eq!(result.score, 0.5);
    }

    #[tokio::test]
    async fn test_case_insensitive() {
        let result = classifier().classify("WORST purchase").await.unwrap();
        assert_eq!(result.label, "negative");
    }

    #[tokio::test]
    async fn test_keywords_inside_longer_words_ignored() {
        let result = classifier()
            .classify("The badge was a bestowed gift")
            .await
            .unwrap();
        assert_eq!(result.score, 0.5);

        let result = classifier()
            .classify("Whatever the badge says, the food was good.")
            .await
            .unwrap();
        assert_eq!(result.label, "positive");
        assert_eq!(result.score, 1.0);
    }

    #[tokio::test]
    async fn test_keywords_next_to_punctuation_count() {
        let result = classifier().classify("(awful), just sad...").await.unwrap();
        assert_eq!(result.label, "negative");
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_artifact_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = Lexicon::default();
        lexicon.write_to(dir.path()).unwrap();

        assert_eq!(Lexicon::from_dir(dir.path()).unwrap(), lexicon);
    }

    #[test]
    fn test_missing_artifact_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LexiconClassifier::from_dir("lexicon", dir.path())
            .err()
            .unwrap();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    #[test]
    fn test_empty_word_list_rejected() {
        let lexicon = Lexicon {
            positive: vec![],
            negative: vec!["bad".to_string()],
        };
        assert!(LexiconClassifier::new("lexicon", &lexicon).is_err());
    }
}
