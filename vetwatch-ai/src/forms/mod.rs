//! Form engine
//!
//! Static schemas for the three tracked forms, plus validation, change
//! detection between two submissions, and completeness scoring.

pub mod differ;
pub mod record;
pub mod schema;
pub mod scorer;
pub mod strategy;
pub mod validator;

pub use differ::{compare, deep_equal, FieldComparison, FormComparison};
pub use record::{FieldValues, FormData};
pub use schema::{all_schemas, get_schema, require_schema, FieldType, FormField, FormSchema, FormType};
pub use scorer::{report, score, FieldAnalysis, FormReport};
pub use validator::{validate, ValidationOutcome};

use thiserror::Error;

/// Form engine errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Form schema not found: {0}")]
    UnknownFormType(String),

    #[error("Cannot compare records of different form types (expected {expected}, found {found})")]
    FormTypeMismatch { expected: String, found: String },
}
