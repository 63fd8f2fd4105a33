//! Differ
//!
//! Compares two submissions of the same form field by field. Every field of
//! the schema is compared, not only the ones present in either record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::record::FormData;
use super::schema::{require_schema, FormType};
use super::strategy::strategy_for;
use super::FormError;
use crate::types::Severity;

/// Comparison of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field_name: String,
    pub old_value: Value,
    pub new_value: Value,
    pub changed: bool,
    pub interpretation: String,
    pub severity: Severity,
}

/// Comparison of two records of one form type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormComparison {
    pub form_type: String,
    pub id1: Uuid,
    pub id2: Uuid,
    pub timestamp1: DateTime<Utc>,
    pub timestamp2: DateTime<Utc>,
    /// Changed fields only, in schema order
    pub field_comparisons: Vec<FieldComparison>,
    pub overall_changes: usize,
    /// Labels of fields whose change is medium or high severity
    pub significant_changes: Vec<String>,
    pub interpretation: String,
}

/// Deep structural equality
///
/// Absent and null are equal. Numbers compare by numeric value, arrays
/// pairwise in order, objects by key set and recursive values.
pub fn deep_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null)) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(Some(l), Some(r)))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, l)| y.get(key).map(|r| deep_equal(Some(l), Some(r))).unwrap_or(false))
        }
        (x, y) => x == y,
    }
}

/// Compare two records of `form_type`
///
/// # Errors
/// - `UnknownFormType` if no schema is registered for `form_type`
/// - `FormTypeMismatch` if either record belongs to another form type
pub fn compare(form_type: &str, old: &FormData, new: &FormData) -> Result<FormComparison, FormError> {
    let schema = require_schema(form_type)?;

    for record in [old, new] {
        if record.form_type != form_type {
            return Err(FormError::FormTypeMismatch {
                expected: form_type.to_string(),
                found: record.form_type.clone(),
            });
        }
    }

    let mut field_comparisons = Vec::new();
    let mut significant_changes = Vec::new();

    for field in schema.fields {
        let old_value = old.get(field.name);
        let new_value = new.get(field.name);

        if deep_equal(old_value, new_value) {
            continue;
        }

        let strategy = strategy_for(field.name);
        let severity = (strategy.severity)(old_value, new_value);

        if severity >= Severity::Medium {
            significant_changes.push(field.label.to_string());
        }

        field_comparisons.push(FieldComparison {
            field_name: field.name.to_string(),
            old_value: old_value.cloned().unwrap_or(Value::Null),
            new_value: new_value.cloned().unwrap_or(Value::Null),
            changed: true,
            interpretation: (strategy.interpret)(field, old_value, new_value),
            severity,
        });
    }

    let interpretation = overall_interpretation(schema.form_type, &field_comparisons, &significant_changes);

    debug!(
        form_type = form_type,
        changes = field_comparisons.len(),
        significant = significant_changes.len(),
        "Form comparison complete"
    );

    Ok(FormComparison {
        form_type: form_type.to_string(),
        id1: old.id,
        id2: new.id,
        timestamp1: old.timestamp,
        timestamp2: new.timestamp,
        overall_changes: field_comparisons.len(),
        field_comparisons,
        significant_changes,
        interpretation,
    })
}

fn overall_interpretation(
    form_type: FormType,
    comparisons: &[FieldComparison],
    significant: &[String],
) -> String {
    if comparisons.is_empty() {
        return "No changes detected in the form".to_string();
    }

    let high = comparisons.iter().filter(|c| c.severity == Severity::High).count();
    let medium = comparisons.iter().filter(|c| c.severity == Severity::Medium).count();

    let mut parts = vec![format!("{} changes detected in the form.", comparisons.len())];

    if high > 0 {
        parts.push(format!("{} critical changes require immediate attention.", high));
    }
    if medium > 0 {
        parts.push(format!("{} important changes detected.", medium));
    }
    if !significant.is_empty() {
        parts.push(format!("Modified fields: {}.", significant.join(", ")));
    }

    parts.push(
        match form_type {
            FormType::AiFeeding => "These changes may affect AI training data.",
            FormType::UserManagement => "User information update completed.",
            FormType::Messaging => "Messaging configuration modified.",
        }
        .to_string(),
    );

    parts.join(" ")
}
