//! Status payloads for the prediction service
//!
//! Both payloads are always served with 200; `model_loaded` tells callers
//! whether predictions are available.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Service status reported on every liveness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Process is up and accepting requests
    Running,
    /// Detailed health check passed
    Healthy,
}

/// Response for `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ServiceStatus,
    pub message: String,
    pub version: String,
    pub model_loaded: bool,
}

impl StatusResponse {
    pub fn new(version: impl Into<String>, model_loaded: bool) -> Self {
        Self {
            status: ServiceStatus::Running,
            message: "Crop Recommendation API is active!".to_string(),
            version: version.into(),
            model_loaded,
        }
    }
}

/// Endpoints advertised by the detailed health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMap {
    pub predict: String,
    pub crops: String,
    pub health: String,
}

impl Default for EndpointMap {
    fn default() -> Self {
        Self {
            predict: "/predict (POST)".to_string(),
            crops: "/crops (GET)".to_string(),
            health: "/health (GET)".to_string(),
        }
    }
}

/// Response for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub model_loaded: bool,
    pub model_path: String,
    /// Whether the artifact file exists right now, independent of what was loaded
    pub model_exists: bool,
    pub endpoints: EndpointMap,
}

impl HealthResponse {
    pub fn new(model_path: &Path, model_loaded: bool) -> Self {
        Self {
            status: ServiceStatus::Healthy,
            model_loaded,
            model_path: model_path.display().to_string(),
            model_exists: model_path.exists(),
            endpoints: EndpointMap::default(),
        }
    }
}
