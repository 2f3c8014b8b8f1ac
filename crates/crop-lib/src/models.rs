//! Core data models for crop recommendation

use serde::{Deserialize, Serialize};

/// Number of input features expected by the model
pub const NUM_FEATURES: usize = 7;

/// Feature columns in model input order.
///
/// The model has no notion of field names, so training and inference must
/// both assemble features in exactly this order.
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Name of the target column in the training CSV
pub const LABEL_COLUMN: &str = "label";

/// Soil and climate measurements for one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilFeatures {
    /// Nitrogen content ratio
    #[serde(rename = "N")]
    pub nitrogen: f64,
    /// Phosphorus content ratio
    #[serde(rename = "P")]
    pub phosphorus: f64,
    /// Potassium content ratio
    #[serde(rename = "K")]
    pub potassium: f64,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Soil pH
    pub ph: f64,
    /// Rainfall in mm
    pub rainfall: f64,
}

impl SoilFeatures {
    /// Features in [`FEATURE_COLUMNS`] order
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Build from values in [`FEATURE_COLUMNS`] order
    pub fn from_array(values: [f64; NUM_FEATURES]) -> Self {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }
}

/// One labeled row of the training dataset.
///
/// Fields are matched to CSV columns by header name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
    pub label: String,
}

impl CropRecord {
    pub fn new(features: SoilFeatures, label: impl Into<String>) -> Self {
        Self {
            nitrogen: features.nitrogen,
            phosphorus: features.phosphorus,
            potassium: features.potassium,
            temperature: features.temperature,
            humidity: features.humidity,
            ph: features.ph,
            rainfall: features.rainfall,
            label: label.into(),
        }
    }

    pub fn features(&self) -> SoilFeatures {
        SoilFeatures {
            nitrogen: self.nitrogen,
            phosphorus: self.phosphorus,
            potassium: self.potassium,
            temperature: self.temperature,
            humidity: self.humidity,
            ph: self.ph,
            rainfall: self.rainfall,
        }
    }
}

/// Crop recommendation produced by a predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPrediction {
    /// Predicted crop label
    pub crop: String,
    /// Maximum class probability as a percentage in [0, 100], 2 decimals
    pub confidence: f64,
}

/// Reference input used for the trainer's sample prediction
pub const SAMPLE_FEATURES: SoilFeatures = SoilFeatures {
    nitrogen: 90.0,
    phosphorus: 42.0,
    potassium: 43.0,
    temperature: 25.5,
    humidity: 80.0,
    ph: 6.5,
    rainfall: 202.5,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_matches_columns() {
        let features = SAMPLE_FEATURES.to_array();
        assert_eq!(features, [90.0, 42.0, 43.0, 25.5, 80.0, 6.5, 202.5]);
        assert_eq!(SoilFeatures::from_array(features), SAMPLE_FEATURES);
    }

    #[test]
    fn test_soil_features_serialize_with_column_names() {
        let json = serde_json::to_value(SAMPLE_FEATURES).unwrap();
        for column in FEATURE_COLUMNS {
            assert!(json.get(column).is_some(), "missing column {}", column);
        }
    }

    #[test]
    fn test_record_features_roundtrip() {
        let record = CropRecord::new(SAMPLE_FEATURES, "rice");
        assert_eq!(record.features(), SAMPLE_FEATURES);
        assert_eq!(record.label, "rice");
    }
}
