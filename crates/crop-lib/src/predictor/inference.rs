//! Random forest inference
//!
//! Runs a loaded [`ModelArtifact`] against a single feature vector.

use super::output::confidence_percent;
use super::Predictor;
use crate::artifact::ModelArtifact;
use crate::error::{CropError, Result};
use crate::forest::argmax;
use crate::models::{CropPrediction, SoilFeatures, NUM_FEATURES};
use ndarray::Array2;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Predictor backed by a trained random forest
pub struct ForestPredictor {
    artifact: ModelArtifact,
}

impl ForestPredictor {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Load the artifact written by the trainer
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Full class-probability distribution, aligned with [`Predictor::classes`]
    pub fn predict_proba(&self, features: &SoilFeatures) -> Result<Vec<f64>> {
        let input = Array2::from_shape_vec((1, NUM_FEATURES), features.to_array().to_vec())
            .map_err(|e| CropError::Inference(e.to_string()))?;
        let proba = self.artifact.forest.predict_proba(input.view())?;
        Ok(proba.row(0).to_vec())
    }
}

impl Predictor for ForestPredictor {
    fn predict(&self, features: &SoilFeatures) -> Result<CropPrediction> {
        let start = Instant::now();

        let probabilities = self.predict_proba(features)?;
        if probabilities.is_empty() {
            return Err(CropError::Inference("model returned no classes".to_string()));
        }
        let best = argmax(probabilities.iter().copied());

        debug!(elapsed_us = start.elapsed().as_micros() as u64, "Inference completed");

        Ok(CropPrediction {
            crop: self.classes()[best].clone(),
            confidence: confidence_percent(probabilities[best]),
        })
    }

    fn classes(&self) -> &[String] {
        self.artifact.forest.classes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestConfig, RandomForest};

    fn predictor() -> ForestPredictor {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = (i % 4) as f64;
            rows.extend_from_slice(&[90.0 + jitter, 42.0, 43.0, 25.0, 80.0, 6.5, 200.0]);
            labels.push("rice");
            rows.extend_from_slice(&[40.0 + jitter, 67.0, 80.0, 18.0, 16.0, 7.3, 80.0]);
            labels.push("chickpea");
            rows.extend_from_slice(&[100.0 + jitter, 28.0, 30.0, 25.0, 58.0, 6.8, 160.0]);
            labels.push("coffee");
        }
        let x = Array2::from_shape_vec((60, NUM_FEATURES), rows).unwrap();
        let config = ForestConfig {
            n_trees: 20,
            max_depth: Some(6),
            seed: 42,
        };
        let forest = RandomForest::fit(&x, &labels, config).unwrap();
        ForestPredictor::new(ModelArtifact::new(forest, 1.0))
    }

    #[test]
    fn test_prediction_in_vocabulary() {
        let predictor = predictor();
        let prediction = predictor.predict(&crate::models::SAMPLE_FEATURES).unwrap();

        assert!(predictor.classes().contains(&prediction.crop));
        assert!(prediction.confidence > 0.0 && prediction.confidence <= 100.0);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let predictor = predictor();
        let features = SoilFeatures::from_array([45.0, 60.0, 75.0, 19.0, 20.0, 7.0, 90.0]);
        let first = predictor.predict(&features).unwrap();
        for _ in 0..5 {
            assert_eq!(predictor.predict(&features).unwrap(), first);
        }
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let predictor = predictor();
        let features = SoilFeatures::from_array([41.0, 67.0, 80.0, 18.0, 16.0, 7.3, 80.0]);
        let proba = predictor.predict_proba(&features).unwrap();
        let max = proba.iter().cloned().fold(f64::MIN, f64::max);

        let prediction = predictor.predict(&features).unwrap();
        assert_eq!(prediction.crop, "chickpea");
        assert_eq!(prediction.confidence, confidence_percent(max));
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
