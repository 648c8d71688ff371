//! DistilBERT sequence classification with Candle
//!
//! Loads a Hugging Face `DistilBertForSequenceClassification` checkpoint from
//! a local directory and runs it on CPU or GPU.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use sentiment_core::{Error, Result};
use std::path::Path;
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationDirection};

const WEIGHTS_FILE: &str = "model.safetensors";
const CONFIG_FILE: &str = "config.json";
/// Tokenizer files, in order of preference
const TOKENIZER_FILES: [&str; 2] = ["tokenizer.json", "vocab.txt"];

/// Maximum number of tokens fed to the model
const MAX_TOKENS: usize = 512;

pub struct DistilBertClassifier {
    name: String,
    tokenizer: Tokenizer,
    model: DistilBertModel,
    pre_classifier: Option<Linear>,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
}

impl DistilBertClassifier {
    /// Load tokenizer, configuration and weights from `model_dir`
    pub fn from_dir(name: impl Into<String>, model_dir: &Path, device: &str) -> Result<Self> {
        let tokenizer = load_tokenizer(model_dir)?;

        let config_path = model_dir.join(CONFIG_FILE);
        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::model_load(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config_json: serde_json::Value = serde_json::from_str(&config_str).map_err(|e| {
            Error::model_load(format!("Failed to parse config JSON: {}", e))
        })?;

        let hidden_size = config_json
            .get("dim")
            .or_else(|| config_json.get("hidden_size"))
            .and_then(|v| v.as_u64())
            .unwrap_or(768) as usize;

        let labels = labels_from_config(&config_json);

        let distilbert_config: DistilBertConfig = serde_json::from_str(&config_str)
            .map_err(|e| Error::model_load(format!("Failed to parse config: {}", e)))?;

        let device = get_device(device)?;
        let vb = load_var_builder(model_dir, &device)?;

        let model = DistilBertModel::load(vb.pp("distilbert"), &distilbert_config)
            .map_err(|e| Error::model_load(format!("Failed to load DistilBERT model: {}", e)))?;

        let pre_classifier = load_pre_classifier(&vb, hidden_size)?;

        let classifier = candle_nn::linear(hidden_size, labels.len(), vb.pp("classifier"))
            .map_err(|e| {
                Error::model_load(format!(
                    "Checkpoint has no classification head for {} labels: {}",
                    labels.len(),
                    e
                ))
            })?;

        tracing::info!(
            "Loaded DistilBERT classifier from {} with labels {:?}",
            model_dir.display(),
            labels
        );

        Ok(Self {
            name: name.into(),
            tokenizer,
            model,
            pre_classifier,
            classifier,
            device,
            labels,
        })
    }

    fn probabilities(&self, text: &str) -> Result<Vec<f32>> {
        let mut encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::prediction(format!("Tokenization failed: {}", e)))?;

        encoding.truncate(MAX_TOKENS, 0, TruncationDirection::Right);

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let input_ids = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference_error("Failed to create input tensor"))?;

        // DistilBERT masks positions where the mask is 1
        let mask: Vec<u8> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| u8::from(x == 0))
            .collect();
        let mask = Tensor::new(mask.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference_error("Failed to create attention mask"))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &mask)
            .map_err(inference_error("Model forward pass failed"))?;

        let cls_embedding = hidden_states
            .i((.., 0, ..))
            .map_err(inference_error("Failed to get CLS token"))?;

        let pooled = match &self.pre_classifier {
            Some(pre_classifier) => pre_classifier
                .forward(&cls_embedding)
                .and_then(|t| t.relu())
                .map_err(inference_error("Pre-classifier failed"))?,
            None => cls_embedding,
        };

        let logits = self
            .classifier
            .forward(&pooled)
            .map_err(inference_error("Classification head failed"))?;

        candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(inference_error("Softmax failed"))
    }
}

#[async_trait]
impl Classifier for DistilBertClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let probs = self.probabilities(text)?;

        let (max_idx, max_prob) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| Error::prediction("Model produced no scores"))?;

        let label = self
            .labels
            .get(max_idx)
            .cloned()
            .unwrap_or_else(|| format!("label_{}", max_idx));

        let all_scores = self
            .labels
            .iter()
            .zip(probs.iter())
            .map(|(label, prob)| (label.clone(), *prob))
            .collect();

        Ok(ClassificationResult {
            label,
            score: max_prob,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(all_scores),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn inference_error(context: &'static str) -> impl Fn(candle_core::Error) -> Error {
    move |e| Error::prediction(format!("{}: {}", context, e))
}

fn get_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0)
            .map_err(|e| Error::model_load(format!("Failed to initialize CUDA: {}", e))),
        "mps" | "metal" => Device::new_metal(0)
            .map_err(|e| Error::model_load(format!("Failed to initialize Metal: {}", e))),
        _ => Ok(Device::Cpu),
    }
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join(WEIGHTS_FILE);
    if !weights_path.exists() {
        return Err(Error::model_load(format!(
            "{} not found in {}",
            WEIGHTS_FILE,
            model_dir.display()
        )));
    }

    // SAFETY: the weights file is owned by the model store and is not
    // modified while the service runs.
    unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(|e| Error::model_load(format!("Failed to load weights: {}", e)))
    }
}

/// The pre_classifier layer is optional, but one that is present must load
fn load_pre_classifier(vb: &VarBuilder, hidden_size: usize) -> Result<Option<Linear>> {
    if !vb.contains_tensor("pre_classifier.weight") {
        tracing::debug!("Checkpoint has no pre_classifier layer");
        return Ok(None);
    }

    let layer = candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier"))
        .map_err(|e| Error::model_load(format!("Failed to load pre_classifier layer: {}", e)))?;
    tracing::debug!("Loaded pre_classifier layer (hidden_size={})", hidden_size);
    Ok(Some(layer))
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_dir.join(TOKENIZER_FILES[0]);
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(|e| Error::model_load(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_dir.join(TOKENIZER_FILES[1]);
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::model_load(format!("Failed to build WordPiece model: {}", e)))?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

        let sep = ("[SEP]".to_string(), 102);
        let cls = ("[CLS]".to_string(), 101);
        tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));

        return Ok(tokenizer);
    }

    Err(Error::model_load(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_dir.display()
    )))
}

/// Labels ordered by class index, taken from `id2label` when present
fn labels_from_config(config: &serde_json::Value) -> Vec<String> {
    let mut indexed: Vec<(usize, String)> = config
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(idx, label)| Some((idx.parse().ok()?, label.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    if indexed.is_empty() {
        return vec!["negative".to_string(), "positive".to_string()];
    }

    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, label)| label).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels_from_id2label() {
        let config = json!({
            "dim": 768,
            "id2label": { "1": "POSITIVE", "0": "NEGATIVE" }
        });
        assert_eq!(labels_from_config(&config), vec!["NEGATIVE", "POSITIVE"]);
    }

    #[test]
    fn test_labels_default_to_binary() {
        assert_eq!(
            labels_from_config(&json!({ "dim": 768 })),
            vec!["negative", "positive"]
        );
    }

    #[test]
    fn test_missing_tokenizer_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_tokenizer(dir.path()).err().unwrap();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    #[test]
    fn test_missing_weights_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_var_builder(dir.path(), &Device::Cpu).err().unwrap();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    fn write_weights(dir: &Path, tensors: &[(&str, Vec<usize>)]) {
        let tensors: std::collections::HashMap<String, Tensor> = tensors
            .iter()
            .map(|(name, shape)| {
                let tensor = Tensor::zeros(shape.as_slice(), DType::F32, &Device::Cpu).unwrap();
                (name.to_string(), tensor)
            })
            .collect();
        candle_core::safetensors::save(&tensors, dir.join(WEIGHTS_FILE)).unwrap();
    }

    #[test]
    fn test_pre_classifier_absent() {
        let dir = tempfile::tempdir().unwrap();
        write_weights(dir.path(), &[("classifier.weight", vec![2, 4]), ("classifier.bias", vec![2])]);
        let vb = load_var_builder(dir.path(), &Device::Cpu).unwrap();

        assert!(load_pre_classifier(&vb, 4).unwrap().is_none());
    }

    #[test]
    fn test_pre_classifier_present() {
        let dir = tempfile::tempdir().unwrap();
        write_weights(
            dir.path(),
            &[("pre_classifier.weight", vec![4, 4]), ("pre_classifier.bias", vec![4])],
        );
        let vb = load_var_builder(dir.path(), &Device::Cpu).unwrap();

        assert!(load_pre_classifier(&vb, 4).unwrap().is_some());
    }

    #[test]
    fn test_malformed_pre_classifier_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        write_weights(
            dir.path(),
            &[("pre_classifier.weight", vec![3, 4]), ("pre_classifier.bias", vec![3])],
        );
        let vb = load_var_builder(dir.path(), &Device::Cpu).unwrap();

        let err = load_pre_classifier(&vb, 4).err().unwrap();
        assert!(matches!(err, Error::ModelLoad(ref msg) if msg.contains("pre_classifier")));
    }

    #[test]
    fn test_cpu_device_fallback() {
        assert!(matches!(get_device("cpu").unwrap(), Device::Cpu));
        assert!(matches!(get_device("unknown").unwrap(), Device::Cpu));
    }
}
