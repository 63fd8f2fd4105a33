//! Analysis result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::types::Severity;

/// Source of the analysed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    /// Still frame captured from a live camera
    Camera,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Camera => "camera",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Species identified by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalType {
    Vaca,
    Caballo,
    Desconocido,
}

impl AnimalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalType::Vaca => "vaca",
            AnimalType::Caballo => "caballo",
            AnimalType::Desconocido => "desconocido",
        }
    }

    /// Map a model-supplied value; anything but vaca/caballo is unknown
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("vaca") => AnimalType::Vaca,
            Some("caballo") => AnimalType::Caballo,
            _ => AnimalType::Desconocido,
        }
    }
}

impl fmt::Display for AnimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One symptom reported by the model, after normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSymptom {
    pub name: String,
    /// Always within [0, 1]
    pub confidence: f64,
    pub description: String,
    pub associated_diseases: Vec<String>,
    pub severity: Severity,
    /// Model-supplied observation time, or the parse time when absent
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Why a model response could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseFailure {
    #[error("Response contains no JSON object")]
    NoJsonObject,

    #[error("Response JSON does not match the expected shape: {0}")]
    MalformedJson(String),
}

/// Outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub file_name: String,
    pub file_type: MediaKind,
    pub symptoms: Vec<DetectedSymptom>,
    /// Overall confidence, always within [0, 1]
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub animal_type: AnimalType,
    pub alert_generated: bool,
    /// Set when the model response was unreadable and the result is the empty fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_failure: Option<ParseFailure>,
}

impl AnalysisResult {
    /// Symptoms severe enough to raise an alert
    pub fn alerting_symptoms(&self) -> impl Iterator<Item = &DetectedSymptom> {
        self.symptoms.iter().filter(|s| s.severity.is_alerting())
    }
}
