//! Configuration loading and config folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (where one exists)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing TOML file is not an error: the service logs a warning and starts
//! with defaults.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for vetwatch-ai
pub const DEFAULT_PORT: u16 = 5740;

/// Default log level when neither RUST_LOG nor the TOML file set one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// TOML config file name inside the VetWatch config folder
pub const CONFIG_FILE_NAME: &str = "vetwatch-ai.toml";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// `[vision]` section of the TOML file
///
/// Every field is optional; absent values fall through to the environment
/// or the compiled default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Bearer token for the chat-completion endpoint
    pub api_key: Option<String>,
    /// Base URL of the vision API (without `/chat/completions`)
    pub api_url: Option<String>,
    /// Model identifier sent with every request
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Contents of `vetwatch-ai.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen port
    pub port: Option<u16>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub vision: VisionConfig,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the TOML file, degrading to defaults when it is missing or invalid
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("No config folder available on this platform, using defaults");
            return Self::default();
        };

        if !path.exists() {
            warn!("Config file not found: {} (using defaults)", path.display());
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load {}: {} (using defaults)", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Default location of the TOML file: `<config_dir>/vetwatch/vetwatch-ai.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vetwatch").join(CONFIG_FILE_NAME))
}

/// Resolve a string setting: environment variable first, then TOML value
///
/// Blank values count as unset at every tier.
pub fn resolve_setting(env_var_name: &str, toml_value: Option<&str>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var_name) {
        if is_valid_key(&value) {
            return Some(value.trim().to_string());
        }
    }

    toml_value
        .filter(|v| is_valid_key(v))
        .map(|v| v.trim().to_string())
}

/// Resolve the HTTP port (CLI → `VETWATCH_PORT` → TOML → default)
pub fn resolve_port(cli_port: Option<u16>, toml_config: &TomlConfig) -> u16 {
    if let Some(port) = cli_port {
        return port;
    }

    if let Ok(value) = std::env::var("VETWATCH_PORT") {
        match value.trim().parse::<u16>() {
            Ok(port) => return port,
            Err(_) => warn!("Ignoring invalid VETWATCH_PORT value: {}", value),
        }
    }

    toml_config.port.unwrap_or(DEFAULT_PORT)
}

/// Validate a key or setting value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_default_toml_config() {
        let config = TomlConfig::default();
        assert!(config.port.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.vision.api_key.is_none());
    }

    #[test]
    fn test_partial_toml_parses() {
        let config: TomlConfig = toml::from_str("port = 8080\n").unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.vision, VisionConfig::default());
    }

    #[test]
    fn test_vision_section_parses() {
        let content = r#"
            [vision]
            api_key = "sk-test"
            api_url = "http://localhost:9000/v1"
            timeout_secs = 5
        "#;
        let config: TomlConfig = toml::from_str(content).unwrap();
        assert_eq!(config.vision.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.vision.api_url.as_deref(), Some("http://localhost:9000/v1"));
        assert_eq!(config.vision.timeout_secs, Some(5));
        assert!(config.vision.model.is_none());
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(TomlConfig::load_or_default(None), TomlConfig::default());
    }
}
