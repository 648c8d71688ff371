//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sentiment_core::Error;
use serde_json::json;
use tracing::{error, warn};

/// Errors surfaced to clients as `{"detail": ...}`
#[derive(Debug)]
pub enum AppError {
    /// Request body missing or malformed
    InvalidRequest(String),
    /// Prediction failed for this request
    PredictionFailed(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "validation",
            AppError::PredictionFailed(_) => "prediction",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => AppError::InvalidRequest(msg),
            Error::Prediction(msg) => AppError::PredictionFailed(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Error::validation(rejection.body_text()).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        metrics::counter!("sentiment_errors_total", "kind" => self.kind()).increment(1);

        let (status, detail) = match self {
            AppError::InvalidRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::PredictionFailed(msg) => {
                error!("Prediction failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            AppError::from(Error::validation("missing text")),
            AppError::InvalidRequest(_)
        ));
        assert!(matches!(
            AppError::from(Error::prediction("boom")),
            AppError::PredictionFailed(_)
        ));
        assert!(matches!(
            AppError::from(Error::model_load("gone")),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let response = AppError::InvalidRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::PredictionFailed("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
