use metrics_exporter_prometheus::PrometheusHandle;
use sentiment_classifiers::Predictor;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Predictor bound to the model loaded at start-up
    pub predictor: Arc<Predictor>,

    /// Prometheus handle for rendering `/metrics`, if an exporter is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
