//! Per-field strategy table
//!
//! The differ and the reporter both need field-specific behaviour (how to
//! phrase a change, how severe it is, how to describe a value, what to
//! recommend, what quality bonus it earns). Each field name maps to one
//! [`FieldStrategy`]; unlisted fields use [`DEFAULT_STRATEGY`]. Supporting a
//! new schema means adding rows here, not branches in the engine.

use serde_json::Value;

use super::record::{display_value, string_items, value_len};
use super::schema::FormField;
use super::validator::{is_valid_email, is_valid_phone};
use crate::types::Severity;

/// Character-delta beyond which a description change is "significant"
const DESCRIPTION_SIGNIFICANT_DELTA: i64 = 50;
/// Character-delta beyond which a description change is medium severity
const DESCRIPTION_MEDIUM_DELTA: i64 = 100;
/// Fixed score bonus for a field exceeding its quality threshold
pub const QUALITY_BONUS: u32 = 5;

type InterpretFn = fn(&FormField, Option<&Value>, Option<&Value>) -> String;
type SeverityFn = fn(Option<&Value>, Option<&Value>) -> Severity;
type AnalyzeFn = fn(&Value) -> String;
type RecommendFn = fn(&Value) -> Vec<String>;
type BonusFn = fn(&Value) -> u32;

/// Field-specific behaviour used by the differ and the reporter
pub struct FieldStrategy {
    /// Phrase a change between two values
    pub interpret: InterpretFn,
    /// Impact of a change
    pub severity: SeverityFn,
    /// Describe a present value
    pub analyze: AnalyzeFn,
    /// Recommendations for a present value
    pub recommend: RecommendFn,
    /// Quality bonus for a value that earned its allocation
    pub bonus: BonusFn,
}

pub static DEFAULT_STRATEGY: FieldStrategy = FieldStrategy {
    interpret: interpret_generic,
    severity: severity_low,
    analyze: analyze_generic,
    recommend: no_recommendations,
    bonus: no_bonus,
};

static STRATEGIES: [(&str, FieldStrategy); 8] = [
    (
        "symptoms",
        FieldStrategy {
            interpret: interpret_symptoms,
            severity: severity_high,
            analyze: analyze_symptoms,
            recommend: recommend_symptoms,
            bonus: bonus_symptoms,
        },
    ),
    (
        "diseases",
        FieldStrategy {
            interpret: interpret_diseases,
            severity: severity_high,
            analyze: analyze_diseases,
            recommend: no_recommendations,
            bonus: bonus_diseases,
        },
    ),
    (
        "animalType",
        FieldStrategy {
            interpret: interpret_animal_type,
            severity: severity_high,
            analyze: analyze_generic,
            recommend: no_recommendations,
            bonus: no_bonus,
        },
    ),
    (
        "description",
        FieldStrategy {
            interpret: interpret_description,
            severity: severity_description,
            analyze: analyze_description,
            recommend: recommend_description,
            bonus: bonus_description,
        },
    ),
    (
        "name",
        FieldStrategy {
            interpret: interpret_name,
            severity: severity_low,
            analyze: analyze_generic,
            recommend: no_recommendations,
            bonus: no_bonus,
        },
    ),
    (
        "email",
        FieldStrategy {
            interpret: interpret_email,
            severity: severity_medium,
            analyze: analyze_email,
            recommend: no_recommendations,
            bonus: no_bonus,
        },
    ),
    (
        "phone",
        FieldStrategy {
            interpret: interpret_phone,
            severity: severity_medium,
            analyze: analyze_phone,
            recommend: no_recommendations,
            bonus: no_bonus,
        },
    ),
    (
        "cargo",
        FieldStrategy {
            interpret: interpret_cargo,
            severity: severity_low,
            analyze: analyze_generic,
            recommend: no_recommendations,
            bonus: no_bonus,
        },
    ),
];

/// Strategy for a field name, falling back to the generic one
pub fn strategy_for(field_name: &str) -> &'static FieldStrategy {
    STRATEGIES
        .iter()
        .find(|(name, _)| *name == field_name)
        .map(|(_, strategy)| strategy)
        .unwrap_or(&DEFAULT_STRATEGY)
}

// ----------------------------------------------------------------------------
// Interpretations
// ----------------------------------------------------------------------------

fn quoted_change(prefix: &str, verb: &str, old: Option<&Value>, new: Option<&Value>) -> String {
    format!(
        "{} {} from \"{}\" to \"{}\"",
        prefix,
        verb,
        display_value(old),
        display_value(new)
    )
}

fn interpret_generic(field: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    quoted_change(field.label, "changed", old, new)
}

fn interpret_animal_type(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    quoted_change("Animal type", "changed", old, new)
}

fn interpret_name(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    quoted_change("Name", "updated", old, new)
}

fn interpret_email(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    quoted_change("Email", "changed", old, new)
}

fn interpret_phone(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    quoted_change("Phone", "updated", old, new)
}

fn interpret_cargo(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    quoted_change("Position", "changed", old, new)
}

/// Items present in `new` but not `old`, and in `old` but not `new`, in list order
pub fn list_difference(old: Option<&Value>, new: Option<&Value>) -> (Vec<String>, Vec<String>) {
    let old_items = string_items(old);
    let new_items = string_items(new);

    let added = new_items
        .iter()
        .filter(|item| !old_items.contains(item))
        .cloned()
        .collect();
    let removed = old_items
        .iter()
        .filter(|item| !new_items.contains(item))
        .cloned()
        .collect();

    (added, removed)
}

fn interpret_list(noun: &str, old: Option<&Value>, new: Option<&Value>) -> String {
    let (added, removed) = list_difference(old, new);
    let mut parts = Vec::new();

    if !added.is_empty() {
        parts.push(format!("{} added: {}.", noun, added.join(", ")));
    }
    if !removed.is_empty() {
        parts.push(format!("{} removed: {}.", noun, removed.join(", ")));
    }

    parts.join(" ")
}

fn interpret_symptoms(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    interpret_list("Symptoms", old, new)
}

fn interpret_diseases(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    interpret_list("Diseases", old, new)
}

fn length_delta(old: Option<&Value>, new: Option<&Value>) -> i64 {
    value_len(new) as i64 - value_len(old) as i64
}

fn interpret_description(_: &FormField, old: Option<&Value>, new: Option<&Value>) -> String {
    let delta = length_delta(old, new);

    if delta > DESCRIPTION_SIGNIFICANT_DELTA {
        format!("Description expanded significantly (+{} characters)", delta)
    } else if delta < -DESCRIPTION_SIGNIFICANT_DELTA {
        format!("Description reduced significantly ({} characters)", delta)
    } else {
        let sign = if delta > 0 { "+" } else { "" };
        format!("Description modified ({}{} characters)", sign, delta)
    }
}

// ----------------------------------------------------------------------------
// Severities
// ----------------------------------------------------------------------------

fn severity_low(_: Option<&Value>, _: Option<&Value>) -> Severity {
    Severity::Low
}

fn severity_medium(_: Option<&Value>, _: Option<&Value>) -> Severity {
    Severity::Medium
}

fn severity_high(_: Option<&Value>, _: Option<&Value>) -> Severity {
    Severity::High
}

fn severity_description(old: Option<&Value>, new: Option<&Value>) -> Severity {
    if length_delta(old, new).abs() > DESCRIPTION_MEDIUM_DELTA {
        Severity::Medium
    } else {
        Severity::Low
    }
}

// ----------------------------------------------------------------------------
// Value analysis
// ----------------------------------------------------------------------------

fn analyze_generic(value: &Value) -> String {
    format!("Value: {}", display_value(Some(value)))
}

fn analyze_symptoms(value: &Value) -> String {
    let items = string_items(Some(value));
    format!("{} symptoms identified: {}", items.len(), items.join(", "))
}

fn analyze_diseases(value: &Value) -> String {
    let items = string_items(Some(value));
    if items.is_empty() {
        "No specific diseases associated".to_string()
    } else {
        format!("{} associated diseases: {}", items.len(), items.join(", "))
    }
}

fn analyze_description(value: &Value) -> String {
    let text = display_value(Some(value));
    let words = text.split(' ').count();
    format!("Description of {} words, {} characters", words, text.chars().count())
}

fn analyze_email(value: &Value) -> String {
    if is_valid_email(&display_value(Some(value))) {
        "Email with valid format".to_string()
    } else {
        "Email with invalid format".to_string()
    }
}

fn analyze_phone(value: &Value) -> String {
    if is_valid_phone(&display_value(Some(value))) {
        "Phone with valid format".to_string()
    } else {
        "Phone with invalid format".to_string()
    }
}

// ----------------------------------------------------------------------------
// Recommendations and bonuses
// ----------------------------------------------------------------------------

fn no_recommendations(_: &Value) -> Vec<String> {
    Vec::new()
}

fn recommend_symptoms(value: &Value) -> Vec<String> {
    if value_len(Some(value)) < 2 {
        vec!["Consider adding more symptoms for a better analysis".to_string()]
    } else {
        Vec::new()
    }
}

fn recommend_description(value: &Value) -> Vec<String> {
    if value_len(Some(value)) < 50 {
        vec!["A more detailed description improves the AI analysis".to_string()]
    } else {
        Vec::new()
    }
}

fn no_bonus(_: &Value) -> u32 {
    0
}

fn bonus_symptoms(value: &Value) -> u32 {
    match value {
        Value::Array(items) if items.len() > 2 => QUALITY_BONUS,
        _ => 0,
    }
}

fn bonus_diseases(value: &Value) -> u32 {
    match value {
        Value::Array(items) if !items.is_empty() => QUALITY_BONUS,
        _ => 0,
    }
}

fn bonus_description(value: &Value) -> u32 {
    if value_len(Some(value)) > 100 {
        QUALITY_BONUS
    } else {
        0
    }
}
