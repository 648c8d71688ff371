//! Sentiment Core
//!
//! Types and errors shared by the sentiment classifiers and the HTTP service.
//!
//! This crate provides:
//! - The error taxonomy used from model loading through request handling
//! - Prediction and model-info types that cross crate boundaries

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ModelInfo, Prediction};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ModelInfo, Prediction};
}
