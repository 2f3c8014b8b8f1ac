//! Crop recommendation prediction service
//!
//! Serves predictions from a model trained offline by `crop-trainer`.
//! The model artifact is read once at startup; without it the service
//! still answers status checks and rejects prediction requests.

pub mod api;
pub mod config;
pub mod error;
