//! Chat-completion client for the vision model
//!
//! POSTs `{api_url}/chat/completions` with bearer auth and returns the text
//! of the first choice. No retry: a failed call is reported to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompt::{system_prompt, USER_INSTRUCTION};
use super::types::MediaKind;
use super::VisionError;
use crate::config::VisionSettings;

const USER_AGENT: &str = concat!("VetWatch/", env!("CARGO_PKG_VERSION"));
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.3;

/// Remote model that turns an image into a text response
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Fail fast when the backend cannot be called at all
    fn ensure_configured(&self) -> Result<(), VisionError> {
        Ok(())
    }

    /// Send one image (as a `data:` URL) and return the raw model text
    async fn complete(&self, kind: MediaKind, image_data_url: &str) -> Result<String, VisionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(String),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// OpenAI-compatible chat-completion client
pub struct ChatCompletionsClient {
    http_client: reqwest::Client,
    settings: VisionSettings,
}

impl ChatCompletionsClient {
    pub fn new(settings: VisionSettings) -> Result<Self, VisionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| VisionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.api_url)
    }

    fn build_request<'a>(&'a self, kind: MediaKind, image_data_url: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system_prompt(kind)),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: USER_INSTRUCTION,
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: image_data_url },
                        },
                    ]),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl VisionBackend for ChatCompletionsClient {
    fn ensure_configured(&self) -> Result<(), VisionError> {
        match &self.settings.api_key {
            Some(key) if vetwatch_common::config::is_valid_key(key) => Ok(()),
            _ => Err(VisionError::Config(format!(
                "Vision API key not configured. Set {} or [vision] api_key in {}",
                crate::config::ENV_API_KEY,
                vetwatch_common::config::CONFIG_FILE_NAME
            ))),
        }
    }

    async fn complete(&self, kind: MediaKind, image_data_url: &str) -> Result<String, VisionError> {
        self.ensure_configured()?;
        let api_key = self.settings.api_key.as_deref().unwrap_or_default();

        debug!(
            endpoint = %self.endpoint(),
            model = %self.settings.model,
            kind = %kind,
            "Calling vision API"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.build_request(kind, image_data_url))
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|body| body.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| VisionError::InvalidResponse("Response has no choices".to_string()))?;

        info!(response_chars = content.len(), "Vision API call successful");

        Ok(content)
    }
}
