//! Observability infrastructure for crop recommendation
//!
//! Provides:
//! - Prometheus metrics (prediction latency, predictions per crop, errors, model state)
//! - Structured JSON logging with tracing

use crate::models::SoilFeatures;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Histogram, IntCounterVec,
    IntGauge,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions: IntCounterVec,
    prediction_errors: IntCounterVec,
    model_loaded: IntGauge,
    model_classes: IntGauge,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "crop_prediction_latency_seconds",
                "Time spent running model inference for a prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions: register_int_counter_vec!(
                "crop_predictions_total",
                "Total number of successful predictions by predicted crop",
                &["crop"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter_vec!(
                "crop_prediction_errors_total",
                "Total number of failed prediction requests by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            model_loaded: register_int_gauge!(
                "crop_model_loaded",
                "1 if a trained model is loaded, 0 otherwise"
            )
            .expect("Failed to register model_loaded"),

            model_classes: register_int_gauge!(
                "crop_model_classes",
                "Number of crops the loaded model can predict"
            )
            .expect("Failed to register model_classes"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, crop: &str) {
        self.inner().predictions.with_label_values(&[crop]).inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner().prediction_errors.with_label_values(&[kind]).inc();
    }

    /// Record the startup model state
    pub fn set_model_state(&self, loaded: bool, classes: usize) {
        self.inner().model_loaded.set(i64::from(loaded));
        self.inner().model_classes.set(classes as i64);
    }
}

/// Structured logger for service and training events
///
/// Provides consistent JSON-formatted logging for predictions,
/// model loading, and other significant events.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log a successful prediction with its full input
    pub fn log_prediction(&self, features: &SoilFeatures, crop: &str, confidence: f64) {
        info!(
            event = "prediction_made",
            service = %self.service,
            n = features.nitrogen,
            p = features.phosphorus,
            k = features.potassium,
            temperature = features.temperature,
            humidity = features.humidity,
            ph = features.ph,
            rainfall = features.rainfall,
            crop = %crop,
            confidence = confidence,
            "Prediction made"
        );
    }

    /// Log an inference failure; the detail never reaches the caller
    pub fn log_prediction_failure(&self, detail: &str) {
        error!(
            event = "prediction_failed",
            service = %self.service,
            detail = %detail,
            "Prediction error"
        );
    }

    pub fn log_model_loaded(&self, path: &str, classes: usize, trees: usize, accuracy: f64) {
        info!(
            event = "model_loaded",
            service = %self.service,
            path = %path,
            classes = classes,
            trees = trees,
            held_out_accuracy = accuracy,
            "Model loaded successfully"
        );
    }

    pub fn log_model_unavailable(&self, path: &str, reason: &str) {
        warn!(
            event = "model_unavailable",
            service = %self.service,
            path = %path,
            reason = %reason,
            "Running without model; train one first with crop-trainer"
        );
    }

    pub fn log_startup(&self, version: &str, addr: &str, model_loaded: bool) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            addr = %addr,
            model_loaded = model_loaded,
            "Crop recommendation API started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Crop recommendation API shutting down"
        );
    }

    pub fn log_training_complete(
        &self,
        samples: usize,
        classes: usize,
        accuracy: f64,
        artifact_path: &str,
        artifact_bytes: u64,
    ) {
        info!(
            event = "training_completed",
            service = %self.service,
            samples = samples,
            classes = classes,
            accuracy = accuracy,
            artifact_path = %artifact_path,
            artifact_bytes = artifact_bytes,
            "Model training complete"
        );
    }
}
