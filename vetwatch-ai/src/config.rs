//! Configuration resolution for vetwatch-ai
//!
//! Vision endpoint settings resolve with ENV → TOML → default priority.
//! A missing API key is not a startup error: the service runs and analysis
//! requests fail with a configuration error until a key is supplied.

use std::time::Duration;
use tracing::{info, warn};
use vetwatch_common::config::{resolve_setting, TomlConfig};

pub const ENV_API_KEY: &str = "VETWATCH_VISION_API_KEY";
pub const ENV_API_URL: &str = "VETWATCH_VISION_API_URL";
pub const ENV_MODEL: &str = "VETWATCH_VISION_MODEL";

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolved settings for the chat-completion endpoint
#[derive(Clone)]
pub struct VisionSettings {
    pub api_key: Option<String>,
    /// Base URL without trailing slash
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for VisionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl VisionSettings {
    /// Resolve from environment and TOML
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        let vision = &toml_config.vision;

        let api_key = resolve_setting(ENV_API_KEY, vision.api_key.as_deref());
        match &api_key {
            Some(_) => info!("Vision API key configured"),
            None => warn!(
                "Vision API key not configured; analysis requests will fail until {} or [vision] api_key is set",
                ENV_API_KEY
            ),
        }

        let api_url = resolve_setting(ENV_API_URL, vision.api_url.as_deref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let model = resolve_setting(ENV_MODEL, vision.model.as_deref())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            timeout: Duration::from_secs(vision.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use vetwatch_common::config::VisionConfig;

    fn clear_env() {
        std::env::remove_var(ENV_API_KEY);
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_MODEL);
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        clear_env();
        let settings = VisionSettings::resolve(&TomlConfig::default());
        assert!(settings.api_key.is_none());
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    #[serial]
    fn test_env_overrides_toml() {
        clear_env();
        std::env::set_var(ENV_API_KEY, "env-key");
        std::env::set_var(ENV_API_URL, "http://localhost:9000/v1/");

        let toml_config = TomlConfig {
            vision: VisionConfig {
                api_key: Some("toml-key".into()),
                api_url: Some("http://toml/v1".into()),
                model: Some("toml-model".into()),
                timeout_secs: Some(5),
            },
            ..Default::default()
        };

        let settings = VisionSettings::resolve(&toml_config);
        assert_eq!(settings.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.api_url, "http://localhost:9000/v1");
        assert_eq!(settings.model, "toml-model");
        assert_eq!(settings.timeout, Duration::from_secs(5));

        clear_env();
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = VisionSettings::default().with_api_key("sk-secret");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
