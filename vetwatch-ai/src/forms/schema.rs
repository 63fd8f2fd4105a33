//! Schema Registry
//!
//! Compiled-in definitions of the three tracked forms. There is no mutation
//! API: schemas are `static` and shared by reference.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::FormError;

/// Tracked form kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormType {
    /// Media ingestion for AI training
    #[serde(rename = "aiFeeding")]
    AiFeeding,
    /// User registration
    #[serde(rename = "userManagement")]
    UserManagement,
    /// Messaging between users
    #[serde(rename = "messaging")]
    Messaging,
}

impl FormType {
    pub const ALL: [FormType; 3] = [FormType::AiFeeding, FormType::UserManagement, FormType::Messaging];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::AiFeeding => "aiFeeding",
            FormType::UserManagement => "userManagement",
            FormType::Messaging => "messaging",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FormError::UnknownFormType(s.to_string()))
    }
}

/// Input type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Url,
    Textarea,
    Select,
    File,
    Array,
}

/// One field declaration
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: &'static str,
    pub required: bool,
    /// Human-readable validation hint shown next to the input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<&'static str>,
    /// Allowed values for select fields; `None` accepts anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

/// A complete form definition
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    #[serde(skip)]
    pub form_type: FormType,
    pub form_name: &'static str,
    pub purpose: &'static str,
    pub fields: &'static [FormField],
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Animal types accepted by the media ingestion form
pub const INGESTION_ANIMAL_TYPES: &[&str] = &["vaca", "caballo", "ambos"];

/// File types accepted by the media ingestion form
pub const INGESTION_FILE_TYPES: &[&str] = &["pdf", "image", "video", "url"];

static AI_FEEDING_FIELDS: [FormField; 7] = [
    FormField {
        name: "description",
        field_type: FieldType::Textarea,
        label: "Content Description",
        required: true,
        validation: None,
        options: None,
        description: Some("Detailed description of the observed symptoms or behaviour"),
    },
    FormField {
        name: "symptoms",
        field_type: FieldType::Array,
        label: "Observed Symptoms",
        required: true,
        validation: None,
        options: None,
        description: Some("Symptoms identified in the content"),
    },
    FormField {
        name: "diseases",
        field_type: FieldType::Array,
        label: "Associated Diseases",
        required: false,
        validation: None,
        options: None,
        description: Some("Diseases potentially related to the symptoms"),
    },
    FormField {
        name: "animalType",
        field_type: FieldType::Select,
        label: "Animal Type",
        required: true,
        validation: None,
        options: Some(INGESTION_ANIMAL_TYPES),
        description: Some("Species the content refers to"),
    },
    FormField {
        name: "fileName",
        field_type: FieldType::Text,
        label: "File Name",
        required: true,
        validation: None,
        options: None,
        description: Some("Name of the uploaded file or URL"),
    },
    FormField {
        name: "fileType",
        field_type: FieldType::Select,
        label: "File Type",
        required: true,
        validation: None,
        options: Some(INGESTION_FILE_TYPES),
        description: Some("Kind of media content"),
    },
    FormField {
        name: "url",
        field_type: FieldType::Url,
        label: "Video URL",
        required: false,
        validation: Some("Valid URL"),
        options: None,
        description: Some("External link to the video content"),
    },
];

static USER_MANAGEMENT_FIELDS: [FormField; 4] = [
    FormField {
        name: "name",
        field_type: FieldType::Text,
        label: "Full Name",
        required: true,
        validation: Some("At least 2 characters"),
        options: None,
        description: Some("First and last name of the user"),
    },
    FormField {
        name: "phone",
        field_type: FieldType::Tel,
        label: "Phone",
        required: true,
        validation: Some("Format: +54 11 1234-5678"),
        options: None,
        description: Some("Phone number with country code"),
    },
    FormField {
        name: "email",
        field_type: FieldType::Email,
        label: "Email",
        required: true,
        validation: Some("Valid and unique email"),
        options: None,
        description: Some("Email address"),
    },
    FormField {
        name: "cargo",
        field_type: FieldType::Text,
        label: "Position",
        required: true,
        validation: None,
        options: None,
        description: Some("Professional role (veterinarian, rancher, ...)"),
    },
];

static MESSAGING_FIELDS: [FormField; 3] = [
    FormField {
        name: "content",
        field_type: FieldType::Textarea,
        label: "Message",
        required: false,
        validation: None,
        options: None,
        description: Some("Text content of the message"),
    },
    FormField {
        name: "receiverId",
        field_type: FieldType::Select,
        label: "Recipient",
        required: true,
        validation: None,
        options: None,
        description: Some("User who will receive the message"),
    },
    FormField {
        name: "attachments",
        field_type: FieldType::File,
        label: "Attachments",
        required: false,
        validation: Some("Images only"),
        options: None,
        description: Some("Images attached to the message"),
    },
];

static SCHEMAS: [FormSchema; 3] = [
    FormSchema {
        form_type: FormType::AiFeeding,
        form_name: "AI Feeding",
        purpose: "Load training data for the AI",
        fields: &AI_FEEDING_FIELDS,
    },
    FormSchema {
        form_type: FormType::UserManagement,
        form_name: "User Management",
        purpose: "Register system users",
        fields: &USER_MANAGEMENT_FIELDS,
    },
    FormSchema {
        form_type: FormType::Messaging,
        form_name: "Messaging System",
        purpose: "Send messages between users",
        fields: &MESSAGING_FIELDS,
    },
];

/// Look up a schema by its form-type identifier
pub fn get_schema(form_type: &str) -> Option<&'static FormSchema> {
    let form_type: FormType = form_type.parse().ok()?;
    SCHEMAS.iter().find(|s| s.form_type == form_type)
}

/// Look up a schema, failing on unknown form types
pub fn require_schema(form_type: &str) -> Result<&'static FormSchema, FormError> {
    get_schema(form_type).ok_or_else(|| FormError::UnknownFormType(form_type.to_string()))
}

/// All schemas keyed by form-type identifier
pub fn all_schemas() -> BTreeMap<&'static str, &'static FormSchema> {
    SCHEMAS.iter().map(|s| (s.form_type.as_str(), s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_schemas_registered() {
        let schemas = all_schemas();
        assert_eq!(schemas.len(), 3);
        assert!(schemas.contains_key("aiFeeding"));
        assert!(schemas.contains_key("userManagement"));
        assert!(schemas.contains_key("messaging"));
    }

    #[test]
    fn test_unknown_schema() {
        assert!(get_schema("payroll").is_none());
        assert!(matches!(
            require_schema("payroll"),
            Err(FormError::UnknownFormType(t)) if t == "payroll"
        ));
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let schema = get_schema("userManagement").unwrap();
        let names: Vec<_> = schema.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "phone", "email", "cargo"]);
    }

    #[test]
    fn test_select_options() {
        let schema = get_schema("aiFeeding").unwrap();
        let animal = schema.field("animalType").unwrap();
        assert_eq!(animal.field_type, FieldType::Select);
        assert_eq!(animal.options, Some(INGESTION_ANIMAL_TYPES));

        let receiver = get_schema("messaging").unwrap().field("receiverId").unwrap();
        assert!(receiver.options.is_none());
    }

    #[test]
    fn test_form_type_round_trip() {
        for form_type in FormType::ALL {
            let parsed: FormType = form_type.as_str().parse().unwrap();
            assert_eq!(parsed, form_type);
        }
        assert!("unknown".parse::<FormType>().is_err());
    }

    #[test]
    fn test_schema_serializes_type_key() {
        let json = serde_json::to_value(get_schema("messaging").unwrap()).unwrap();
        assert_eq!(json["form_name"], "Messaging System");
        assert_eq!(json["fields"][0]["type"], "textarea");
        assert!(json["fields"][0].get("options").is_none());
    }
}
