//! Integration tests for the form engine
//!
//! Exercises validation, comparison and scoring through the public
//! `vetwatch_ai::forms` API, the way the HTTP layer uses them.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use vetwatch_ai::forms::{
    self, compare, get_schema, report, score, FieldValues, FormData, FormError,
};
use vetwatch_ai::types::Severity;

fn values(v: Value) -> FieldValues {
    v.as_object().cloned().expect("object literal")
}

fn ingestion(symptoms: Value) -> FieldValues {
    values(json!({
        "description": "Caballo criollo con temblores en los miembros anteriores",
        "symptoms": symptoms,
        "animalType": "caballo",
        "fileName": "criollo.mp4",
        "fileType": "video"
    }))
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_valid_user_submission() {
    let data = values(json!({
        "name": "Marta Díaz",
        "phone": "+54 9 351 555-0101",
        "email": "marta@tambo.com.ar",
        "cargo": "Ganadera"
    }));

    let outcome = forms::validate("userManagement", &data);
    assert!(outcome.is_valid);
    assert!(outcome.errors.is_empty());
}

#[test]
fn test_every_missing_required_field_is_reported() {
    let outcome = forms::validate("userManagement", &FieldValues::new());
    assert!(!outcome.is_valid);
    assert_eq!(
        outcome.errors,
        vec![
            "Full Name is required".to_string(),
            "Phone is required".to_string(),
            "Email is required".to_string(),
            "Position is required".to_string(),
        ]
    );
}

#[test]
fn test_is_valid_iff_no_errors() {
    let samples = [
        ("aiFeeding", ingestion(json!(["Temblores"]))),
        ("aiFeeding", ingestion(json!([]))),
        ("aiFeeding", ingestion(json!(["Temblores", ""]))),
        ("messaging", values(json!({ "content": "hola" }))),
        ("messaging", values(json!({ "receiverId": "u-1" }))),
        ("unknown", FieldValues::new()),
    ];

    for (form_type, data) in samples {
        let outcome = forms::validate(form_type, &data);
        assert_eq!(outcome.is_valid, outcome.errors.is_empty(), "{}: {:?}", form_type, outcome);
    }
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_symptom_list_diff_reports_only_additions() {
    let old = FormData::new("aiFeeding", ingestion(json!(["Cojera"])));
    let new = FormData::new("aiFeeding", ingestion(json!(["Cojera", "Temblores"])));

    let comparison = compare("aiFeeding", &old, &new).unwrap();
    assert_eq!(comparison.overall_changes, 1);

    let field = &comparison.field_comparisons[0];
    assert_eq!(field.field_name, "symptoms");
    assert!(field.changed);
    assert_eq!(field.severity, Severity::High);
    assert_eq!(field.interpretation, "Symptoms added: Temblores.");
}

#[test]
fn test_comparing_a_record_with_itself_finds_nothing() {
    let record = FormData::new("aiFeeding", ingestion(json!(["Cojera", "Fiebre"])));
    let comparison = compare("aiFeeding", &record, &record).unwrap();

    assert_eq!(comparison.overall_changes, 0);
    assert!(comparison.significant_changes.is_empty());
    assert_eq!(comparison.interpretation, "No changes detected in the form");
}

#[test]
fn test_cross_type_comparison_is_rejected() {
    let a = FormData::new("aiFeeding", ingestion(json!(["Cojera"])));
    let b = FormData::new("userManagement", values(json!({ "name": "Ana" })));

    let err = compare("aiFeeding", &a, &b).unwrap_err();
    assert_eq!(
        err,
        FormError::FormTypeMismatch {
            expected: "aiFeeding".to_string(),
            found: "userManagement".to_string(),
        }
    );
}

#[test]
fn test_description_growth_is_medium_when_large() {
    let mut before = ingestion(json!(["Cojera"]));
    before.insert("description".into(), json!("Cojera leve"));
    let mut after = before.clone();
    after.insert("description".into(), json!("x".repeat(140)));

    let comparison = compare(
        "aiFeeding",
        &FormData::new("aiFeeding", before),
        &FormData::new("aiFeeding", after),
    )
    .unwrap();

    let field = &comparison.field_comparisons[0];
    assert_eq!(field.severity, Severity::Medium);
    assert!(field.interpretation.starts_with("Description expanded significantly"));
    assert_eq!(comparison.significant_changes, vec!["Content Description".to_string()]);
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_score_never_decreases_as_fields_fill() {
    let schema = get_schema("aiFeeding").unwrap();
    let steps = [
        ("description", json!("Caballo criollo con temblores")),
        ("symptoms", json!(["Temblores"])),
        ("animalType", json!("caballo")),
        ("fileName", json!("criollo.mp4")),
        ("fileType", json!("video")),
        ("symptoms", json!(["Temblores", "Rigidez"])),
        ("symptoms", json!(["Temblores", "Rigidez", "Sudoración"])),
        ("diseases", json!(["Tétanos"])),
        ("url", json!("https://example.org/criollo.mp4")),
    ];

    let mut data = FieldValues::new();
    let mut previous = score(schema, &data);

    for (field, value) in steps {
        data.insert(field.to_string(), value);
        let current = score(schema, &data);
        assert!(current >= previous, "score dropped after setting {}", field);
        assert!(current <= 100);
        previous = current;
    }

    assert_eq!(previous, 100);
}

#[test]
fn test_report_round_trip_through_history_record() {
    let record = FormData::new("aiFeeding", ingestion(json!(["Temblores", "Rigidez", "Sudoración"])));
    let report = report("aiFeeding", &record).unwrap();

    // 100 required + 5 symptom bonus of 120
    assert_eq!(report.overall_score, 88);
    assert!(report.summary.starts_with("AI Feeding completed with 88% quality."));
    assert!(report.summary.contains("3 symptoms and 0 diseases"));
    assert_eq!(report.field_analysis.len(), get_schema("aiFeeding").unwrap().fields.len());
    assert_eq!(
        report.recommendations,
        vec!["Associating diseases helps automatic diagnosis".to_string()]
    );
}
