//! Conversion between the `vec` field of a request body and the JSON text
//! stored in the `users.vec` column.
//!
//! The column holds a compact JSON array (`[1.5,-2,3]`) or NULL. Numbers are
//! kept as `serde_json` values so integers round-trip as integers, and
//! integral floats are written without a fraction (`1.0` is stored as `1`).

use serde_json::Value;
use crate::error::{AppError, AppResult};

pub const INVALID_VECTOR: &str = "vec must be an array of numbers";

// Integers above 2^53 are not exactly representable as f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Encode an incoming `vec` value for storage.
///
/// Absent and `null` map to `None`. Arrays of numbers (including the empty
/// array) are serialized compactly. Anything else is a validation error.
pub fn encode(vec: Option<&Value>) -> AppResult<Option<String>> {
    match vec {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) if items.iter().all(Value::is_number) => {
            let normalized: Vec<Value> = items.iter().map(normalize_number).collect();
            Ok(Some(serde_json::to_string(&normalized)?))
        }
        Some(_) => Err(AppError::validation(INVALID_VECTOR)),
    }
}

fn normalize_number(number: &Value) -> Value {
    match number.as_f64() {
        Some(float)
            if number.is_f64() && float.fract() == 0.0 && float.abs() < MAX_EXACT_INTEGER =>
        {
            Value::from(float as i64)
        }
        _ => number.clone(),
    }
}

/// Decode stored vector text. Unreadable or non-array content reads as `None`.
pub fn decode(stored: Option<&str>) -> Option<Vec<Value>> {
    let text = stored.filter(|text| !text.is_empty())?;

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items),
        Ok(other) => {
            tracing::debug!("Stored vec is not an array, reading as null: {}", other);
            None
        }
        Err(e) => {
            tracing::debug!("Stored vec is not valid JSON, reading as null: {}", e);
            None
        }
    }
}
