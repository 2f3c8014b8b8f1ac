//! Crop prediction engine

mod inference;
mod output;
mod request;

pub use inference::ForestPredictor;
pub use output::{confidence_percent, round2};
pub use request::{FieldError, RequestErrors};

use crate::error::Result;
use crate::models::{CropPrediction, SoilFeatures};

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Predict a crop and the confidence of that prediction
    fn predict(&self, features: &SoilFeatures) -> Result<CropPrediction>;

    /// Labels this predictor can emit, sorted and de-duplicated
    fn classes(&self) -> &[String];
}
