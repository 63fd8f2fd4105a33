//! Alert rule
//!
//! An analysis with at least one high or critical symptom raises an alert
//! addressed to every user in the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::store::models::User;
use crate::types::Severity;
use crate::vision::{AnalysisResult, AnimalType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    /// The only field mutated after creation
    pub is_read: bool,
    pub animal_type: AnimalType,
    pub detected_symptoms: Vec<String>,
    pub suggested_diseases: Vec<String>,
    pub analysis_id: Uuid,
    pub sent_to_users: Vec<Uuid>,
}

/// Build the alert for `result`, or None when nothing qualifies
pub fn build_alert(result: &AnalysisResult, users: &[User]) -> Option<Alert> {
    let qualifying: Vec<_> = result.alerting_symptoms().collect();
    if qualifying.is_empty() {
        return None;
    }

    let severity = if qualifying.iter().any(|s| s.severity == Severity::Critical) {
        Severity::Critical
    } else {
        Severity::High
    };

    let mut suggested_diseases: Vec<String> = Vec::new();
    for disease in qualifying.iter().flat_map(|s| s.associated_diseases.iter()) {
        if !suggested_diseases.contains(disease) {
            suggested_diseases.push(disease.clone());
        }
    }

    debug!(
        analysis_id = %result.id,
        qualifying = qualifying.len(),
        severity = %severity,
        recipients = users.len(),
        "Alert rule matched"
    );

    Some(Alert {
        id: Uuid::new_v4(),
        title: format!("Symptoms detected in {}", result.animal_type),
        description: format!("{} symptoms detected that require attention", qualifying.len()),
        severity,
        timestamp: Utc::now(),
        is_read: false,
        animal_type: result.animal_type,
        detected_symptoms: qualifying.iter().map(|s| s.name.clone()).collect(),
        suggested_diseases,
        analysis_id: result.id,
        sent_to_users: users.iter().map(|u| u.id).collect(),
    })
}
