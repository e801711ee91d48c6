//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use crate::services::payload::PayloadDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream API configuration
    pub openai: OpenAIConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Optional JSON file overriding the model limit table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_limits_file: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key; requests fail with a server error while it is unset
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model every prompt is sent to
    pub model: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: 30,
        }
    }
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Maximum characters in a plain `prompt`
    pub max_prompt_length: usize,
    /// Output token cap used when the caller sets none
    pub default_max_output_tokens: u32,
    /// Temperature used when the caller sets none
    pub default_temperature: f32,
}

impl Default for RequestConfig {
    fn default() -> Self {
        let defaults = PayloadDefaults::default();
        Self {
            max_request_size: 1_048_576,
            max_prompt_length: 200,
            default_max_output_tokens: defaults.max_output_tokens,
            default_temperature: defaults.temperature,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
    /// Whether CORS is enabled
    pub cors_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            cors_enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let port = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string());

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: port.parse().context("Invalid port number")?,
            },
            openai: OpenAIConfig {
                api_key: std::env::var("OPENAI_API_KEY").ok(),
                base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                model: get_env_or_default("OPENAI_MODEL", "gpt-3.5-turbo"),
                timeout: get_env_or_default("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
            },
            request: RequestConfig {
                max_request_size: get_env_or_default("MAX_REQUEST_SIZE", "1048576")
                    .parse()
                    .context("Invalid maximum request size")?,
                max_prompt_length: get_env_or_default("MAX_PROMPT_LENGTH", "200")
                    .parse()
                    .context("Invalid maximum prompt length")?,
                default_max_output_tokens: get_env_or_default("DEFAULT_MAX_OUTPUT_TOKENS", "100")
                    .parse()
                    .context("Invalid default max output tokens")?,
                default_temperature: get_env_or_default("DEFAULT_TEMPERATURE", "0.7")
                    .parse()
                    .context("Invalid default temperature")?,
            },
            security: SecurityConfig {
                allowed_origins: get_env_or_default("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                cors_enabled: get_env_or_default("CORS_ENABLED", "true")
                    .parse()
                    .context("Invalid CORS enabled flag")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
            model_limits_file: std::env::var("MODEL_LIMITS_FILE").ok().map(PathBuf::from),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if let Some(api_key) = &self.openai.api_key {
            if api_key.is_empty() {
                anyhow::bail!("OpenAI API key cannot be empty");
            }
            if api_key.contains(char::is_whitespace) {
                anyhow::bail!("OpenAI API key cannot contain whitespace characters");
            }
        }

        if !self.openai.base_url.starts_with("http") {
            anyhow::bail!("Invalid OpenAI base URL format, should start with 'http'");
        }

        if self.openai.model.trim().is_empty() {
            anyhow::bail!("OpenAI model cannot be empty");
        }

        if self.openai.timeout == 0 {
            anyhow::bail!("Timeout value cannot be 0");
        }

        if self.request.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }

        if self.request.max_prompt_length == 0 {
            anyhow::bail!("Maximum prompt length cannot be 0");
        }

        if self.request.default_max_output_tokens == 0 {
            anyhow::bail!("Default max output tokens cannot be 0");
        }

        if !(0.0..=2.0).contains(&self.request.default_temperature) {
            anyhow::bail!(
                "Default temperature must be between 0.0 and 2.0, got {}",
                self.request.default_temperature
            );
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Whether an upstream API key is configured
    pub fn has_api_key(&self) -> bool {
        self.openai.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Fallbacks for unset request fields
    pub fn payload_defaults(&self) -> PayloadDefaults {
        PayloadDefaults {
            max_output_tokens: self.request.default_max_output_tokens,
            temperature: self.request.default_temperature,
        }
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert!(!settings.has_api_key());
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.openai.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_payload_defaults_follow_request_config() {
        let mut settings = Settings::default();
        settings.request.default_max_output_tokens = 400;
        settings.request.default_temperature = 0.2;

        let defaults = settings.payload_defaults();
        assert_eq!(defaults.max_output_tokens, 400);
        assert_eq!(defaults.temperature, 0.2);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk test".to_string());
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.request.default_temperature = 2.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.logging.format = "xml".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-secret".to_string());

        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
