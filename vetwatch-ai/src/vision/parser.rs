//! Model response parser
//!
//! The model is asked for JSON but often wraps it in prose or code fences.
//! The parser takes the substring from the first `{` to the last `}`,
//! deserialises it through a permissive schema, then normalises every value:
//!
//! | Field                 | Rule                                            |
//! |-----------------------|-------------------------------------------------|
//! | confidence (any)      | clamped into [0, 1]                             |
//! | overall confidence    | 0.5 when absent                                 |
//! | severity              | unknown values become `medium`                  |
//! | animalType            | anything but vaca/caballo becomes `desconocido` |
//! | symptom name          | "Unknown symptom" when absent or empty          |
//! | symptom description   | "No description" when absent or empty           |
//! | associatedDiseases    | non-arrays become empty, non-strings dropped    |
//! | non-object symptom    | kept as an "Unknown symptom" with defaults      |
//!
//! Unreadable responses become [`ParseOutcome::Fallback`] instead of errors.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use super::types::{AnimalType, DetectedSymptom, ParseFailure};
use crate::types::Severity;

/// Overall confidence assumed when the model omits it
pub const DEFAULT_OVERALL_CONFIDENCE: f64 = 0.5;

const UNKNOWN_SYMPTOM_NAME: &str = "Unknown symptom";
const MISSING_DESCRIPTION: &str = "No description";

/// Normalised content of a readable response
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub symptoms: Vec<DetectedSymptom>,
    pub confidence: f64,
    pub animal_type: AnimalType,
}

impl ParsedAnalysis {
    /// Whether any symptom is high or critical
    pub fn alert_generated(&self) -> bool {
        self.symptoms.iter().any(|s| s.severity.is_alerting())
    }
}

/// Result of reading a model response
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(ParsedAnalysis),
    Fallback(ParseFailure),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    symptoms: Option<Vec<Value>>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    animal_type: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSymptom {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    associated_diseases: Option<Value>,
    #[serde(default)]
    severity: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    location: Option<Value>,
}

/// Substring from the first `{` to the last `}`, if both exist in that order
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a raw model response
pub fn parse_response(text: &str) -> ParseOutcome {
    let Some(candidate) = extract_json_object(text) else {
        return ParseOutcome::Fallback(ParseFailure::NoJsonObject);
    };

    let raw: RawAnalysis = match serde_json::from_str(candidate) {
        Ok(raw) => raw,
        Err(e) => return ParseOutcome::Fallback(ParseFailure::MalformedJson(e.to_string())),
    };

    let symptoms = raw
        .symptoms
        .unwrap_or_default()
        .into_iter()
        .map(|item| normalize_symptom(raw_symptom(item)))
        .collect();

    let confidence = match raw.confidence.as_ref().filter(|v| !v.is_null()) {
        Some(value) => clamp_unit(as_number(value).unwrap_or(0.0)),
        None => DEFAULT_OVERALL_CONFIDENCE,
    };

    let animal_type = AnimalType::from_wire(raw.animal_type.as_ref().and_then(Value::as_str));

    ParseOutcome::Parsed(ParsedAnalysis {
        symptoms,
        confidence,
        animal_type,
    })
}

/// Non-object entries keep their slot as an all-defaults symptom
fn raw_symptom(item: Value) -> RawSymptom {
    match item {
        Value::Object(_) => serde_json::from_value(item).unwrap_or_default(),
        _ => RawSymptom::default(),
    }
}

fn normalize_symptom(raw: RawSymptom) -> DetectedSymptom {
    let confidence = raw
        .confidence
        .as_ref()
        .and_then(as_number)
        .map(clamp_unit)
        .unwrap_or(0.0);

    let severity = raw
        .severity
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Severity::parse)
        .unwrap_or(Severity::Medium);

    let associated_diseases = match raw.associated_diseases {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    DetectedSymptom {
        name: non_empty_text(raw.name).unwrap_or_else(|| UNKNOWN_SYMPTOM_NAME.to_string()),
        confidence,
        description: non_empty_text(raw.description).unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        associated_diseases,
        severity,
        timestamp: non_empty_text(raw.timestamp).unwrap_or_else(|| Utc::now().to_rfc3339()),
        location: non_empty_text(raw.location),
    }
}

/// Numbers, and strings holding numbers
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_empty_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}
