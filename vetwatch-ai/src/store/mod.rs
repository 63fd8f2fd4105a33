//! Application state store
//!
//! Holds every in-memory collection behind its own async lock. Users,
//! training data, analyses, alerts and messages are kept newest first; the
//! form history is kept in submission order. Nothing is deleted, and the only
//! in-place updates are the read flags on alerts and messages.

pub mod models;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;
use vetwatch_common::{Error, Result};

use crate::alerts::Alert;
use crate::forms::FormData;
use crate::types::Severity;
use crate::vision::AnalysisResult;
use models::{Message, Role, TrainingData, User};

/// Initial (or exported) contents of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub training_data: Vec<TrainingData>,
    #[serde(default)]
    pub analysis_results: Vec<AnalysisResult>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub form_history: Vec<FormData>,
}

/// User directory filter; text matches name or email, case-insensitive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    Read,
    Unread,
}

/// Alert filter; text matches title or description, case-insensitive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    pub search: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<ReadStatus>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let text = search_term(&self.search)
            .map(|term| contains_ci(&user.name, term) || contains_ci(&user.email, term))
            .unwrap_or(true);
        let role = self.role.map(|r| user.role == r).unwrap_or(true);
        text && role
    }
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let text = search_term(&self.search)
            .map(|term| contains_ci(&alert.title, term) || contains_ci(&alert.description, term))
            .unwrap_or(true);
        let severity = self.severity.map(|s| alert.severity == s).unwrap_or(true);
        let status = match self.status {
            None => true,
            Some(ReadStatus::Read) => alert.is_read,
            Some(ReadStatus::Unread) => !alert.is_read,
        };
        text && severity && status
    }
}

/// In-memory application state
#[derive(Debug, Default)]
pub struct AppStore {
    users: RwLock<Vec<User>>,
    training_data: RwLock<Vec<TrainingData>>,
    analysis_results: RwLock<Vec<AnalysisResult>>,
    alerts: RwLock<Vec<Alert>>,
    messages: RwLock<Vec<Message>>,
    form_history: RwLock<Vec<FormData>>,
}

impl AppStore {
    /// Build a store from a snapshot; collections are taken as already ordered
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            users: RwLock::new(snapshot.users),
            training_data: RwLock::new(snapshot.training_data),
            analysis_results: RwLock::new(snapshot.analysis_results),
            alerts: RwLock::new(snapshot.alerts),
            messages: RwLock::new(snapshot.messages),
            form_history: RwLock::new(snapshot.form_history),
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Prepend `user`; fails if the email is already registered (case-insensitive)
    ///
    /// The check and the insert share one write guard.
    pub async fn add_user(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        let email = user.email.trim().to_lowercase();

        if users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(Error::Conflict(format!("Email already registered: {}", user.email)));
        }

        debug!(user_id = %user.id, "Adding user");
        users.insert(0, user.clone());
        Ok(user)
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn search_users(&self, filter: &UserFilter) -> Vec<User> {
        self.users
            .read()
            .await
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect()
    }

    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    // ------------------------------------------------------------------
    // Training data and analyses
    // ------------------------------------------------------------------

    pub async fn add_training_data(&self, data: TrainingData) -> TrainingData {
        self.training_data.write().await.insert(0, data.clone());
        data
    }

    pub async fn training_data(&self) -> Vec<TrainingData> {
        self.training_data.read().await.clone()
    }

    pub async fn add_analysis_result(&self, result: AnalysisResult) -> AnalysisResult {
        self.analysis_results.write().await.insert(0, result.clone());
        result
    }

    pub async fn analysis_results(&self) -> Vec<AnalysisResult> {
        self.analysis_results.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    pub async fn add_alert(&self, alert: Alert) -> Alert {
        self.alerts.write().await.insert(0, alert.clone());
        alert
    }

    pub async fn alerts(&self, filter: &AlertFilter) -> Vec<Alert> {
        self.alerts
            .read()
            .await
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect()
    }

    pub async fn unread_alert_count(&self) -> usize {
        self.alerts.read().await.iter().filter(|a| !a.is_read).count()
    }

    /// Flag an alert as read; idempotent
    pub async fn mark_alert_read(&self, id: Uuid) -> Result<Alert> {
        let mut alerts = self.alerts.write().await;
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("Alert {}", id)))?;
        alert.is_read = true;
        Ok(alert.clone())
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    pub async fn add_message(&self, message: Message) -> Message {
        self.messages.write().await.insert(0, message.clone());
        message
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// Messages sent or received by `user_id`, oldest first
    pub async fn conversation(&self, user_id: Uuid) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        // stable: equal timestamps keep insertion order
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    pub async fn last_message(&self, user_id: Uuid) -> Option<Message> {
        self.conversation(user_id).await.pop()
    }

    /// Unread messages sent by `user_id`
    pub async fn unread_count(&self, user_id: Uuid) -> usize {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.sender_id == user_id && !m.is_read)
            .count()
    }

    /// Flag a message as read; idempotent
    pub async fn mark_message_read(&self, id: Uuid) -> Result<Message> {
        let mut messages = self.messages.write().await;
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::NotFound(format!("Message {}", id)))?;
        message.is_read = true;
        Ok(message.clone())
    }

    // ------------------------------------------------------------------
    // Form history
    // ------------------------------------------------------------------

    /// Append a submission to the history
    pub async fn record_form(&self, record: FormData) -> FormData {
        debug!(record_id = %record.id, form_type = %record.form_type, "Recording form submission");
        self.form_history.write().await.push(record.clone());
        record
    }

    /// History in submission order, optionally limited to one form type
    pub async fn form_history(&self, form_type: Option<&str>) -> Vec<FormData> {
        self.form_history
            .read()
            .await
            .iter()
            .filter(|r| form_type.map(|t| r.form_type == t).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub async fn find_form_record(&self, id: Uuid) -> Option<FormData> {
        self.form_history.read().await.iter().find(|r| r.id == id).cloned()
    }
}
