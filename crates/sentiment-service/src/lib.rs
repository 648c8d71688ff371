//! Sentiment Service
//!
//! HTTP front end for the sentiment predictor. The binary loads the model once
//! at start-up, then serves:
//! - `GET /` liveness
//! - `GET /health` readiness with the bound model version
//! - `POST /predict` sentiment prediction
//! - `GET /model` model metadata
//! - `GET /metrics` Prometheus metrics

pub mod cli;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use cli::Cli;
pub use error::AppError;
pub use routes::{create_router, PredictionRequest, PredictionResponse};
pub use server::serve;
pub use state::AppState;
