//! Submitted form records and value helpers
//!
//! Form values arrive as untyped JSON. The helpers here define what counts as
//! "present" so the validator, differ and scorer agree on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field name → submitted value
pub type FieldValues = Map<String, Value>;

/// One submission of a tracked form
///
/// Created once per submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    pub id: Uuid,
    pub form_type: String,
    pub data: FieldValues,
    pub timestamp: DateTime<Utc>,
}

impl FormData {
    pub fn new(form_type: impl Into<String>, data: FieldValues) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_type: form_type.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// Whether a value carries content
///
/// Null, `false`, zero, and the empty string carry nothing. Arrays and
/// objects always do, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a field is missing for required-field purposes (falsy or an empty list)
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(v) => !is_truthy(v),
    }
}

/// Text form of a value for pattern checks
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Human-readable rendering used in interpretations and analyses
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "empty".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| display_value(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Length of a value: characters for strings, items for arrays, zero otherwise
pub fn value_len(value: Option<&Value>) -> usize {
    match value {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    }
}

/// String items of an array value; non-arrays yield nothing
pub fn string_items(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(|v| display_value(Some(v))).collect(),
        _ => Vec::new(),
    }
}
