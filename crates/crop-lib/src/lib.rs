//! Library for crop recommendation
//!
//! This crate provides the core functionality for:
//! - Loading and splitting the labeled soil/climate dataset
//! - Fitting a random forest of decision trees
//! - Persisting the fitted model as a single artifact file
//! - Validating prediction requests and running inference
//! - Health payloads and observability for the prediction service

pub mod artifact;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod forest;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod training;

pub use artifact::ModelArtifact;
pub use error::{CropError, Result};
pub use health::{EndpointMap, HealthResponse, StatusResponse};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
