//! Model storage, remote fetch and classifier construction
//!
//! A model is stored under `<models_dir>/<safe-name>-<version>`. On start-up the
//! loader uses that directory when every artifact file is present; otherwise it
//! fetches the files into a staging directory, moves them into place, and then
//! loads from disk. Later starts for the same pair never touch the network.

use crate::classifier::Classifier;
use crate::lexicon::{Lexicon, LexiconClassifier, LEXICON_FILE};
use crate::model_config::{ModelBackend, ModelConfig};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use sentiment_core::{Error, ModelInfo, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Files that make up a model artifact on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFiles {
    /// Every one of these must be present
    pub required: Vec<&'static str>,

    /// At least one of these must be present (empty means no constraint)
    pub one_of: Vec<&'static str>,

    /// Copied when the remote has them
    pub optional: Vec<&'static str>,
}

impl ArtifactFiles {
    /// Artifact layout for a backend
    pub fn for_backend(backend: ModelBackend) -> Self {
        match backend {
            ModelBackend::DistilBert => Self {
                required: vec!["config.json", "model.safetensors"],
                one_of: vec!["tokenizer.json", "vocab.txt"],
                optional: vec!["tokenizer_config.json", "special_tokens_map.json"],
            },
            ModelBackend::Lexicon => Self {
                required: vec![LEXICON_FILE],
                one_of: Vec::new(),
                optional: Vec::new(),
            },
        }
    }

    /// Check whether `dir` holds a complete artifact
    pub fn is_complete(&self, dir: &Path) -> bool {
        self.required.iter().all(|file| dir.join(file).is_file())
            && (self.one_of.is_empty() || self.one_of.iter().any(|file| dir.join(file).is_file()))
    }
}

/// Where the model came from on this start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResolution {
    /// Artifact was already on disk
    FoundLocal(PathBuf),

    /// Artifact was fetched and persisted during this start
    FetchedRemote(PathBuf),
}

impl ModelResolution {
    /// Directory holding the artifact
    pub fn path(&self) -> &Path {
        match self {
            Self::FoundLocal(path) | Self::FetchedRemote(path) => path,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::FoundLocal(_) => "local",
            Self::FetchedRemote(_) => "remote",
        }
    }
}

impl fmt::Display for ModelResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path().display(), self.source())
    }
}

/// A remote fetch request
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub model_name: &'a str,
    pub revision: &'a str,
    pub files: &'a ArtifactFiles,
}

/// Source of model artifacts for cold starts.
///
/// Implementations write the requested files into `dest`, which already
/// exists and is empty. This call blocks.
pub trait ModelFetcher: Send + Sync {
    fn fetch(&self, request: FetchRequest<'_>, dest: &Path) -> Result<()>;
}

/// Fetches artifacts from the Hugging Face Hub.
///
/// Downloads go through the hub cache (`HF_HOME`) before being copied into
/// the model store.
#[derive(Debug, Clone, Default)]
pub struct HfHubFetcher;

impl HfHubFetcher {
    pub fn new() -> Self {
        Self
    }

    fn api(&self) -> Result<Api> {
        Api::new()
            .map_err(|e| Error::model_load(format!("Failed to initialize HuggingFace API: {}", e)))
    }
}

impl ModelFetcher for HfHubFetcher {
    fn fetch(&self, request: FetchRequest<'_>, dest: &Path) -> Result<()> {
        tracing::info!(
            "Downloading model from HuggingFace: {} @ {}",
            request.model_name,
            request.revision
        );

        let api = self.api()?;
        let repo = api.repo(Repo::with_revision(
            request.model_name.to_string(),
            RepoType::Model,
            request.revision.to_string(),
        ));

        let copy_into_dest = |file: &str, src: &Path| -> Result<()> {
            std::fs::copy(src, dest.join(file))
                .map(|_| ())
                .map_err(|e| Error::model_load(format!("Failed to persist {}: {}", file, e)))
        };

        for &file in &request.files.required {
            tracing::debug!("Downloading {}", file);
            let src = repo.get(file).map_err(|e| {
                Error::model_load(format!(
                    "Failed to download {} from {}: {}",
                    file, request.model_name, e
                ))
            })?;
            copy_into_dest(file, &src)?;
        }

        if !request.files.one_of.is_empty() {
            let mut found = false;
            for &file in &request.files.one_of {
                if let Ok(src) = repo.get(file) {
                    tracing::debug!("Found {}", file);
                    copy_into_dest(file, &src)?;
                    found = true;
                    break;
                }
            }

            if !found {
                return Err(Error::model_load(format!(
                    "{} has none of {:?}",
                    request.model_name, request.files.one_of
                )));
            }
        }

        for &file in &request.files.optional {
            match repo.get(file) {
                Ok(src) => copy_into_dest(file, &src)?,
                Err(_) => tracing::debug!("File not found: {}", file),
            }
        }

        Ok(())
    }
}

/// Writes the built-in keyword lists, so the lexicon backend cold-starts
/// without network access
#[derive(Debug, Clone, Default)]
pub struct BundledLexiconFetcher;

impl ModelFetcher for BundledLexiconFetcher {
    fn fetch(&self, request: FetchRequest<'_>, dest: &Path) -> Result<()> {
        tracing::info!("Writing built-in lexicon for {}", request.model_name);
        Lexicon::default().write_to(dest)
    }
}

/// Directory a `(model_name, model_version)` pair is stored under
pub fn model_dir(models_dir: &Path, model_name: &str, model_version: &str) -> PathBuf {
    let safe_name = model_name.replace(['/', '\\'], "_");
    models_dir.join(format!("{}-{}", safe_name, model_version))
}

/// On-disk model store with a remote fallback
pub struct ModelStore {
    root: PathBuf,
    fetcher: Arc<dyn ModelFetcher>,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>, fetcher: Arc<dyn ModelFetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
        }
    }

    /// Store rooted at `config.models_dir` with the fetcher for its backend
    pub fn from_config(config: &ModelConfig) -> Self {
        let fetcher: Arc<dyn ModelFetcher> = match config.model_backend {
            ModelBackend::DistilBert => Arc::new(HfHubFetcher::new()),
            ModelBackend::Lexicon => Arc::new(BundledLexiconFetcher),
        };
        Self::new(config.models_dir.clone(), fetcher)
    }

    /// Locate the artifact for `config`, fetching and persisting it if absent
    pub fn resolve(&self, config: &ModelConfig) -> Result<ModelResolution> {
        let files = ArtifactFiles::for_backend(config.model_backend);
        let target = model_dir(&self.root, &config.model_name, &config.model_version);

        if files.is_complete(&target) {
            tracing::info!("Using local model at {}", target.display());
            return Ok(ModelResolution::FoundLocal(target));
        }

        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::model_load(format!(
                "Failed to create models directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let staging = self.staging_dir(&target);
        remove_dir_if_exists(&staging)?;
        std::fs::create_dir_all(&staging).map_err(|e| {
            Error::model_load(format!(
                "Failed to create staging directory {}: {}",
                staging.display(),
                e
            ))
        })?;

        let request = FetchRequest {
            model_name: &config.model_name,
            revision: &config.model_revision,
            files: &files,
        };

        if let Err(e) = self.fetch_into(request, &staging) {
            if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                tracing::warn!(
                    "Failed to remove staging directory {}: {}",
                    staging.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        // A directory without a complete artifact is left over from an
        // interrupted run and is replaced.
        remove_dir_if_exists(&target)?;
        std::fs::rename(&staging, &target).map_err(|e| {
            Error::model_load(format!(
                "Failed to move model into {}: {}",
                target.display(),
                e
            ))
        })?;

        tracing::info!("Model persisted to {}", target.display());
        Ok(ModelResolution::FetchedRemote(target))
    }

    fn fetch_into(&self, request: FetchRequest<'_>, staging: &Path) -> Result<()> {
        self.fetcher.fetch(request, staging).map_err(|e| match e {
            Error::ModelLoad(_) => e,
            other => Error::model_load(other.to_string()),
        })?;

        if !request.files.is_complete(staging) {
            return Err(Error::model_load(format!(
                "Fetched artifact for {} is incomplete",
                request.model_name
            )));
        }

        Ok(())
    }

    fn staging_dir(&self, target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.root.join(format!(".{}.partial", name))
    }
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| {
            Error::model_load(format!("Failed to remove {}: {}", dir.display(), e))
        })?;
    }
    Ok(())
}

/// A classifier bound to the model version it was loaded from
#[derive(Clone)]
pub struct LoadedModel {
    pub classifier: Arc<dyn Classifier>,
    pub name: String,
    pub version: String,
    pub backend: ModelBackend,
    pub resolution: ModelResolution,
}

impl LoadedModel {
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            model_type: sentiment_core::types::MODEL_TYPE.to_string(),
            backend: self.backend.to_string(),
            source: self.resolution.source().to_string(),
        }
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("classifier", &self.classifier.name())
            .field("name", &self.name)
            .field("version", &self.version)
            .field("backend", &self.backend)
            .field("resolution", &self.resolution)
            .finish()
    }
}

/// Resolves and loads the configured model
pub struct ModelLoader {
    store: ModelStore,
}

impl ModelLoader {
    pub fn new(store: ModelStore) -> Self {
        Self { store }
    }

    /// Loader over [`ModelStore::from_config`]
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(ModelStore::from_config(config))
    }

    /// Resolve the artifact and build its classifier. Blocks.
    pub fn load(&self, config: &ModelConfig) -> Result<LoadedModel> {
        tracing::info!(
            "Loading model {} (v{}) with {} backend",
            config.model_name,
            config.model_version,
            config.model_backend
        );

        let resolution = self.store.resolve(config)?;
        let classifier = build_classifier(config, resolution.path())?;

        tracing::info!(
            "Model loaded successfully: {} (v{}) from {}",
            config.model_name,
            config.model_version,
            resolution
        );

        Ok(LoadedModel {
            classifier,
            name: config.model_name.clone(),
            version: config.model_version.clone(),
            backend: config.model_backend,
            resolution,
        })
    }
}

fn build_classifier(config: &ModelConfig, dir: &Path) -> Result<Arc<dyn Classifier>> {
    match config.model_backend {
        ModelBackend::Lexicon => Ok(Arc::new(LexiconClassifier::from_dir(
            config.model_name.clone(),
            dir,
        )?)),
        ModelBackend::DistilBert => {
            #[cfg(feature = "ml-models")]
            {
                Ok(Arc::new(crate::distilbert::DistilBertClassifier::from_dir(
                    config.model_name.clone(),
                    dir,
                    &config.device,
                )?))
            }

            #[cfg(not(feature = "ml-models"))]
            {
                let _ = dir;
                Err(Error::model_load(
                    "DistilBERT backend requires the 'ml-models' feature",
                ))
            }
        }
    }
}
