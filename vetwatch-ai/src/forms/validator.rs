//! Validator
//!
//! Checks a submitted record against its schema. Problems are collected, not
//! thrown: the caller gets every error and warning at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::record::{as_text, is_missing, is_truthy, FieldValues};
use super::schema::{get_schema, FieldType, FormField};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+]?[0-9\s\-()]{10,}$").expect("valid phone regex"));

/// Result of validating one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Validate `data` against the schema registered for `form_type`
///
/// Warnings never affect `is_valid`.
pub fn validate(form_type: &str, data: &FieldValues) -> ValidationOutcome {
    let Some(schema) = get_schema(form_type) else {
        return ValidationOutcome::from_parts(
            vec![format!("Form schema not found: {}", form_type)],
            Vec::new(),
        );
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for field in schema.fields {
        let value = data.get(field.name);

        if field.required && is_missing(value) {
            errors.push(format!("{} is required", field.label));
        }

        if let Some(value) = value.filter(|v| is_truthy(v)) {
            check_type(field, value, &mut errors, &mut warnings);
        }
    }

    debug!(
        form_type = form_type,
        errors = errors.len(),
        warnings = warnings.len(),
        "Form validation complete"
    );

    ValidationOutcome::from_parts(errors, warnings)
}

fn check_type(field: &FormField, value: &Value, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    match field.field_type {
        FieldType::Email => {
            if !is_valid_email(&as_text(value)) {
                errors.push(format!("{} must have a valid format", field.label));
            }
        }
        FieldType::Tel => {
            if !is_valid_phone(&as_text(value)) {
                errors.push(format!("{} must have a valid format", field.label));
            }
        }
        FieldType::Url => {
            if reqwest::Url::parse(&as_text(value)).is_err() {
                errors.push(format!("{} must be a valid URL", field.label));
            }
        }
        FieldType::Array => match value {
            Value::Array(items) => {
                let has_blank = items.iter().any(|item| match item {
                    Value::String(s) => s.trim().is_empty(),
                    other => !is_truthy(other),
                });
                if has_blank {
                    warnings.push(format!("{} contains empty items", field.label));
                }
            }
            _ => errors.push(format!("{} must be a list", field.label)),
        },
        FieldType::Select => {
            if let Some(options) = field.options {
                let matches = value.as_str().map(|s| options.contains(&s)).unwrap_or(false);
                if !matches {
                    errors.push(format!("{} must be a valid option", field.label));
                }
            }
        }
        FieldType::Text | FieldType::Textarea | FieldType::File => {}
    }
}
