//! Prediction output post-processing
//!
//! Converts the model's class-probability output into the confidence
//! reported to callers.

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Maximum class probability as a percentage in [0, 100], rounded to 2 decimals
pub fn confidence_percent(max_probability: f64) -> f64 {
    round2(max_probability.clamp(0.0, 1.0) * 100.0)
}
