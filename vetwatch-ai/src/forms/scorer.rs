//! Scorer / Reporter
//!
//! Computes a 0-100 completeness score for a record and builds a
//! human-readable report with per-field analysis and recommendations.
//!
//! # Scoring Algorithm
//! - Each field is allocated 20 points if required, 10 if optional
//! - The allocation is earned when the value is present and is either a
//!   scalar or a non-empty list
//! - Earned fields may add a fixed +5 quality bonus (more than two symptoms,
//!   at least one disease, a description over 100 characters)
//! - Score = round(100 × earned / allocatable), capped at 100

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::record::{display_value, is_missing, is_truthy, value_len, FieldValues, FormData};
use super::schema::{require_schema, FormSchema, FormType};
use super::strategy::strategy_for;
use super::FormError;

const REQUIRED_ALLOCATION: u32 = 20;
const OPTIONAL_ALLOCATION: u32 = 10;
/// Scores below this trigger a "complete more fields" recommendation
const LOW_SCORE_THRESHOLD: u8 = 70;

/// Analysis of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAnalysis {
    /// Field label
    pub field: String,
    pub value: Value,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

/// Full report on one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormReport {
    pub summary: String,
    pub field_analysis: Vec<FieldAnalysis>,
    pub overall_score: u8,
    pub recommendations: Vec<String>,
}

/// Whether a value earns its field allocation
fn earns_allocation(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => false,
        other => is_truthy(other),
    }
}

/// Completeness score of `data` against `schema`, 0..=100
///
/// Non-decreasing as fields are filled: adding a qualifying value can only
/// add allocation points or bonuses.
pub fn score(schema: &FormSchema, data: &FieldValues) -> u8 {
    let mut earned = 0_u32;
    let mut allocatable = 0_u32;

    for field in schema.fields {
        let allocation = if field.required {
            REQUIRED_ALLOCATION
        } else {
            OPTIONAL_ALLOCATION
        };
        allocatable += allocation;

        if let Some(value) = data.get(field.name).filter(|v| earns_allocation(v)) {
            earned += allocation;
            earned += (strategy_for(field.name).bonus)(value);
        }
    }

    if allocatable == 0 {
        return 0;
    }

    let percent = (100.0 * earned as f64 / allocatable as f64).round();
    percent.min(100.0) as u8
}

/// Build the report for a stored record
///
/// # Errors
/// `UnknownFormType` if no schema is registered for `form_type`.
pub fn report(form_type: &str, record: &FormData) -> Result<FormReport, FormError> {
    let schema = require_schema(form_type)?;
    let data = &record.data;

    let field_analysis = schema
        .fields
        .iter()
        .map(|field| {
            let value = data.get(field.name);
            let strategy = strategy_for(field.name);

            let (analysis, recommendations) = match value {
                Some(v) if !is_missing(Some(v)) => ((strategy.analyze)(v), (strategy.recommend)(v)),
                _ if field.required => (
                    "Required field not completed".to_string(),
                    vec![format!("Completing {} is mandatory", field.label)],
                ),
                _ => ("Optional field empty".to_string(), Vec::new()),
            };

            FieldAnalysis {
                field: field.label.to_string(),
                value: value.cloned().unwrap_or(Value::Null),
                analysis,
                recommendations,
            }
        })
        .collect();

    let overall_score = score(schema, data);
    let summary = summary(schema, data, overall_score);
    let recommendations = general_recommendations(schema.form_type, data, overall_score);

    debug!(
        form_type = form_type,
        record_id = %record.id,
        score = overall_score,
        "Form report generated"
    );

    Ok(FormReport {
        summary,
        field_analysis,
        overall_score,
        recommendations,
    })
}

fn summary(schema: &FormSchema, data: &FieldValues, score: u8) -> String {
    let detail = match schema.form_type {
        FormType::AiFeeding => format!(
            "Contains {} symptoms and {} diseases to train the AI.",
            value_len(data.get("symptoms")),
            value_len(data.get("diseases"))
        ),
        FormType::UserManagement => format!(
            "User \"{}\" registered as {}.",
            display_value(data.get("name")),
            display_value(data.get("cargo"))
        ),
        FormType::Messaging => {
            let with_attachments = value_len(data.get("attachments")) > 0;
            format!(
                "Message {} prepared.",
                if with_attachments { "with attachments" } else { "as text" }
            )
        }
    };

    format!("{} completed with {}% quality. {}", schema.form_name, score, detail)
}

fn general_recommendations(form_type: FormType, data: &FieldValues, score: u8) -> Vec<String> {
    let mut recommendations = Vec::new();

    if score < LOW_SCORE_THRESHOLD {
        recommendations.push("Complete more fields to improve data quality".to_string());
    }

    match form_type {
        FormType::AiFeeding => {
            if value_len(data.get("symptoms")) < 2 {
                recommendations.push("Adding more symptoms improves AI training".to_string());
            }
            if value_len(data.get("diseases")) == 0 {
                recommendations.push("Associating diseases helps automatic diagnosis".to_string());
            }
        }
        FormType::UserManagement => {
            let has = |name: &str| data.get(name).map(is_truthy).unwrap_or(false);
            if !has("phone") || !has("email") {
                recommendations.push("Complete contact information is essential".to_string());
            }
        }
        FormType::Messaging => {}
    }

    recommendations
}
