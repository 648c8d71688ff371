//! Sentiment Service
//!
//! Loads the configured model, then serves predictions over HTTP. A model that
//! cannot be loaded aborts start-up.

use anyhow::{Context, Result};
use clap::Parser;
use sentiment_classifiers::{ModelConfig, ModelLoader, Predictor};
use sentiment_service::telemetry::{init_metrics, init_tracing};
use sentiment_service::{serve, AppState, Cli};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    let config = ModelConfig::from_env().context("Invalid model configuration")?;
    info!("Starting {}", config.service_name);
    info!("Model: {} (v{})", config.model_name, config.model_version);
    info!("Models directory: {}", config.models_dir.display());

    let metrics_handle = init_metrics()?;

    let load_config = config.clone();
    let model = tokio::task::spawn_blocking(move || {
        ModelLoader::from_config(&load_config).load(&load_config)
    })
    .await
    .context("Model loading task failed")?
    .map_err(|e| {
        error!("Error loading model: {}", e);
        e
    })
    .context("Failed to load model")?;

    let mut predictor = Predictor::from_loaded(model);
    if let Some(max) = cli.max_concurrent_predictions {
        predictor = predictor.with_max_concurrency(max);
    }
    info!(
        "Predictor ready (max {} concurrent inferences)",
        predictor.max_concurrency()
    );

    let state = AppState::new(predictor).with_metrics(metrics_handle);

    let addr = cli.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve(listener, state).await
}
