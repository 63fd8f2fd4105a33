//! Directory, messaging and training records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role of a user in the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Veterinario,
    Ganadero,
    Investigador,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Veterinario => "veterinario",
            Role::Ganadero => "ganadero",
            Role::Investigador => "investigador",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Free-text position (e.g. "Veterinaria de campo")
    pub cargo: String,
    pub role: Role,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Registration payload; field names match the userManagement form
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub cargo: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn register(new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone.trim().to_string(),
            cargo: new.cargo.trim().to_string(),
            role: new.role,
            is_online: false,
            last_seen: now,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
    /// Bytes
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub attachments: Vec<Attachment>,
}

/// Attachment as submitted, before an id is assigned
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Message payload; field names match the messaging form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<NewAttachment>,
}

impl Message {
    pub fn send(new: NewMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            content: new.content,
            timestamp: Utc::now(),
            is_read: false,
            attachments: new
                .attachments
                .into_iter()
                .map(|a| Attachment {
                    id: Uuid::new_v4(),
                    kind: a.kind,
                    url: a.url,
                    name: a.name,
                    size: a.size,
                })
                .collect(),
        }
    }

    /// Whether `user_id` is the sender or the receiver
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// Media ingested to train the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    pub id: Uuid,
    pub description: String,
    pub symptoms: Vec<String>,
    pub diseases: Vec<String>,
    /// vaca, caballo or ambos
    pub animal_type: String,
    pub file_name: String,
    /// pdf, image, video or url
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ingestion payload; field names match the aiFeeding form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrainingData {
    pub description: String,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub diseases: Vec<String>,
    pub animal_type: String,
    pub file_name: String,
    pub file_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl TrainingData {
    pub fn ingest(new: NewTrainingData) -> Self {
        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            id: Uuid::new_v4(),
            description: new.description,
            symptoms: clean(new.symptoms),
            diseases: clean(new.diseases),
            animal_type: new.animal_type,
            file_name: new.file_name,
            file_type: new.file_type,
            url: new.url.filter(|u| !u.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_user_defaults() {
        let new: NewUser = serde_json::from_value(json!({
            "name": " Ana Ruiz ", "phone": "+54 11 1234-5678", "email": "ana@vet.org", "cargo": "Vet"
        }))
        .unwrap();
        let user = User::register(new);
        assert_eq!(user.name, "Ana Ruiz");
        assert_eq!(user.role, Role::Veterinario);
        assert!(!user.is_online);
        assert_eq!(user.created_at, user.last_seen);
    }

    #[test]
    fn test_message_from_camel_case_payload() {
        let sender = Uuid::new_v4();
        let receiver = Uuid::new_v4();
        let new: NewMessage = serde_json::from_value(json!({
            "senderId": sender,
            "receiverId": receiver,
            "content": "Revisar la vaca 12",
            "attachments": [{"type": "image", "url": "blob:1", "name": "foto.jpg", "size": 2048}]
        }))
        .unwrap();

        let message = Message::send(new);
        assert!(!message.is_read);
        assert!(message.involves(sender));
        assert!(message.involves(receiver));
        assert!(!message.involves(Uuid::new_v4()));
        assert_eq!(message.attachments[0].kind, AttachmentKind::Image);
    }

    #[test]
    fn test_training_data_drops_blank_items() {
        let new: NewTrainingData = serde_json::from_value(json!({
            "description": "Cojera",
            "symptoms": ["Cojera", "  "],
            "animalType": "vaca",
            "fileName": "a.mp4",
            "fileType": "video",
            "url": ""
        }))
        .unwrap();

        let data = TrainingData::ingest(new);
        assert_eq!(data.symptoms, vec!["Cojera".to_string()]);
        assert!(data.diseases.is_empty());
        assert!(data.url.is_none());
    }

    #[test]
    fn test_role_wire_values() {
        assert_eq!(serde_json::to_string(&Role::Investigador).unwrap(), "\"investigador\"");
        let role: Role = serde_json::from_str("\"ganadero\"").unwrap();
        assert_eq!(role, Role::Ganadero);
    }
}
