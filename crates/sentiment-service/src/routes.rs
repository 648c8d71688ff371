//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sentiment_core::ModelInfo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Service identifier reported by the liveness endpoint
const SERVICE_ID: &str = "sentiment-analysis";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/predict", post(predict))
        .route("/model", get(model_info))
        .route("/metrics", get(render_metrics))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "active", "service": SERVICE_ID }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model_version": state.predictor.model_version(),
    }))
}

/// Body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub text: String,
}

/// Successful `POST /predict` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Request text as received, before sanitation
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub model_version: String,
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    metrics::counter!("sentiment_requests_total").increment(1);

    let Json(request) = payload?;
    debug!("Received prediction request ({} chars)", request.text.chars().count());

    let prediction = state.predictor.predict(&request.text).await?;

    Ok(Json(PredictionResponse {
        text: request.text,
        sentiment: prediction.sentiment,
        confidence: prediction.confidence,
        model_version: state.predictor.model_version().to_string(),
    }))
}

async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.predictor.model_info().clone())
}

async fn render_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state
        .metrics_handle
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Metrics exporter is not enabled".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

async fn fallback() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
