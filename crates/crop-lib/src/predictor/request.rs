//! Prediction request validation
//!
//! Turns a loosely typed JSON object into [`SoilFeatures`], collecting every
//! missing or non-numeric field instead of stopping at the first one.

use crate::models::{SoilFeatures, FEATURE_COLUMNS, NUM_FEATURES};
use serde_json::{Map, Value};
use std::fmt;

/// A field that is present but cannot be used as a feature value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Validation failures for one request, fields listed in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestErrors {
    pub missing: Vec<&'static str>,
    pub invalid: Vec<FieldError>,
}

impl RequestErrors {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    pub fn missing_message(&self) -> String {
        format!("Missing required fields: {}", self.missing.join(", "))
    }

    pub fn invalid_message(&self) -> String {
        let details: Vec<String> = self.invalid.iter().map(ToString::to_string).collect();
        format!("Invalid input data: {}", details.join("; "))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerce a JSON number or numeric string to a finite float
fn coerce(value: &Value) -> Result<f64, String> {
    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("{} is not representable as a float", n))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("could not convert string to float: '{}'", s))?,
        other => return Err(format!("expected a number, got {}", json_type(other))),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err("value must be a finite number".to_string())
    }
}

impl SoilFeatures {
    /// Validate a request body, enumerating all seven fields up front
    pub fn from_json_map(body: &Map<String, Value>) -> Result<Self, RequestErrors> {
        let mut errors = RequestErrors::default();
        let mut values = [0.0; NUM_FEATURES];

        for (slot, field) in values.iter_mut().zip(FEATURE_COLUMNS) {
            match body.get(field) {
                None => errors.missing.push(field),
                Some(value) => match coerce(value) {
                    Ok(number) => *slot = number,
                    Err(reason) => errors.invalid.push(FieldError { field, reason }),
                },
            }
        }

        if errors.is_empty() {
            Ok(SoilFeatures::from_array(values))
        } else {
            Err(errors)
        }
    }
}
