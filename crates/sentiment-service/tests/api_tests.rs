//! HTTP API tests against the router with in-process predictors

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use sentiment_classifiers::{ClassificationResult, Classifier, Lexicon, LexiconClassifier, Predictor};
use sentiment_core::types::MODEL_TYPE;
use sentiment_core::{Error, ModelInfo, Result};
use sentiment_service::{create_router, AppState, PredictionResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const MODEL_VERSION: &str = "1.0.0";

fn test_info() -> ModelInfo {
    ModelInfo {
        name: "test/lexicon".to_string(),
        version: MODEL_VERSION.to_string(),
        model_type: MODEL_TYPE.to_string(),
        backend: "lexicon".to_string(),
        source: "local".to_string(),
    }
}

fn lexicon_app() -> Router {
    let classifier = LexiconClassifier::new("test/lexicon", &Lexicon::default()).unwrap();
    let predictor = Predictor::new(Arc::new(classifier), test_info());
    create_router(AppState::new(predictor))
}

struct BrokenClassifier;

#[async_trait]
impl Classifier for BrokenClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult> {
        Err(Error::prediction("inference backend unavailable"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn broken_app() -> Router {
    let predictor = Predictor::new(Arc::new(BrokenClassifier), test_info());
    create_router(AppState::new(predictor))
}

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn predict_text(app: Router, text: &str) -> PredictionResponse {
    let (status, body) = send(app, predict_request(json!({ "text": text }).to_string())).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_root_reports_active() {
    let (status, body) = send(lexicon_app(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "active", "service": "sentiment-analysis" }));
}

#[tokio::test]
async fn test_health_reports_model_version() {
    let (status, body) = send(lexicon_app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "model_version": MODEL_VERSION }));
}

#[tokio::test]
async fn test_positive_text() {
    let response = predict_text(lexicon_app(), "I love this product, it's amazing!").await;

    assert_eq!(response.text, "I love this product, it's amazing!");
    assert_eq!(response.sentiment, "positive");
    assert!(response.confidence > 0.5);
    assert!(response.confidence <= 1.0);
    assert_eq!(response.model_version, MODEL_VERSION);
}

#[tokio::test]
async fn test_negative_text() {
    let response = predict_text(lexicon_app(), "This is terrible, I hate it.").await;

    assert_eq!(response.sentiment, "negative");
    assert!(response.confidence > 0.5);
    assert!(response.confidence <= 1.0);
}

#[tokio::test]
async fn test_empty_text_is_neutral() {
    let response = predict_text(lexicon_app(), "").await;

    assert_eq!(response.text, "");
    assert_eq!(response.sentiment, "neutral");
    assert_eq!(response.confidence, 0.5);
    assert_eq!(response.model_version, MODEL_VERSION);
}

#[tokio::test]
async fn test_whitespace_text_is_neutral_and_echoed() {
    let response = predict_text(lexicon_app(), "   \n\t ").await;

    assert_eq!(response.text, "   \n\t ");
    assert_eq!(response.sentiment, "neutral");
    assert_eq!(response.confidence, 0.5);
}

#[tokio::test]
async fn test_long_text_echoed_unchanged() {
    let text = format!("great {}", "word ".repeat(400));
    let response = predict_text(lexicon_app(), &text).await;

    assert_eq!(response.text, text);
    assert_eq!(response.sentiment, "positive");
}

#[tokio::test]
async fn test_missing_text_field_is_rejected() {
    let (status, body) = send(lexicon_app(), predict_request("{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (status, body) = send(lexicon_app(), predict_request("{\"text\": ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_non_string_text_is_rejected() {
    let (status, _) = send(lexicon_app(), predict_request(json!({ "text": 42 }).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(json!({ "text": "great" }).to_string()))
        .unwrap();
    let (status, _) = send(lexicon_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_prediction_failure_returns_500_with_detail() {
    let (status, body) = send(
        broken_app(),
        predict_request(json!({ "text": "anything at all" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("inference backend unavailable"));
}

#[tokio::test]
async fn test_service_healthy_after_prediction_failure() {
    let app = broken_app();

    let (status, _) = send(
        app.clone(),
        predict_request(json!({ "text": "anything" }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_empty_text_skips_failing_classifier() {
    let (status, body) = send(broken_app(), predict_request(json!({ "text": "" }).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "neutral");
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) = send(lexicon_app(), get("/model")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "test/lexicon");
    assert_eq!(body["version"], MODEL_VERSION);
    assert_eq!(body["type"], "sentiment-analysis");
    assert_eq!(body["backend"], "lexicon");
}

#[tokio::test]
async fn test_metrics_unavailable_without_exporter() {
    let (status, _) = send(lexicon_app(), get("/metrics")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(lexicon_app(), get("/does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not Found" }));
}

#[tokio::test]
async fn test_predict_requires_post() {
    let (status, _) = send(lexicon_app(), get("/predict")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
