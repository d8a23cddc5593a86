//! Parameter extraction with validation errors.
//!
//! Every helper reads one key from the JSON arguments object and fails with
//! [`ToolError::Validation`] naming that key.

use std::str::FromStr;

use serde_json::Value;

use crate::errors::ToolError;

/// Arguments must be a JSON object (or absent, treated as empty).
pub fn ensure_object(params: &Value) -> Result<(), ToolError> {
    match params {
        Value::Object(_) | Value::Null => Ok(()),
        other => Err(ToolError::validation(format!(
            "arguments must be an object, got {}",
            type_name(other)
        ))),
    }
}

/// A required, non-blank string.
pub fn validate_required_string(params: &Value, key: &str, description: &str) -> Result<String, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Err(ToolError::validation(format!(
            "missing required parameter '{key}' ({description})"
        ))),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ToolError::validation(format!(
            "parameter '{key}' must not be empty"
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(key, "a string", other)),
    }
}

/// An optional string; blank strings count as absent.
pub fn get_optional_string(params: &Value, key: &str) -> Result<Option<String>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_type(key, "a string", other)),
    }
}

/// An optional finite number.
pub fn get_optional_f64(params: &Value, key: &str) -> Result<Option<f64>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(ToolError::validation(format!("parameter '{key}' must be a finite number"))),
        },
        Some(other) => Err(wrong_type(key, "a number", other)),
    }
}

/// An optional string parsed into a closed set of values.
pub fn get_optional_enum<T>(params: &Value, key: &str, allowed: &[&str]) -> Result<Option<T>, ToolError>
where
    T: FromStr,
{
    let Some(raw) = get_optional_string(params, key)? else {
        return Ok(None);
    };
    let normalized = raw.trim().to_ascii_lowercase();
    if !allowed.contains(&normalized.as_str()) {
        return Err(ToolError::validation(format!(
            "parameter '{key}' must be one of {}, got '{raw}'",
            allowed.join(", ")
        )));
    }
    normalized
        .parse::<T>()
        .map(Some)
        .map_err(|_| ToolError::validation(format!("parameter '{key}' has invalid value '{raw}'")))
}

/// Check that `value` lies in `[min, max]`.
pub fn ensure_range(key: &str, value: f64, min: f64, max: f64) -> Result<f64, ToolError> {
    if value < min || value > max {
        return Err(ToolError::validation(format!(
            "parameter '{key}' must be between {min} and {max}, got {value}"
        )));
    }
    Ok(value)
}

fn wrong_type(key: &str, expected: &str, got: &Value) -> ToolError {
    ToolError::validation(format!(
        "parameter '{key}' must be {expected}, got {}",
        type_name(got)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
