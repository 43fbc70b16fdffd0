//! Configuration loading and validation for the gateway service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated gateway configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Maximum accepted request body size in bytes (multipart uploads).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Per-request timeout in seconds. Generous, because large uploads are
    /// streamed through the cipher engine within a single request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Base URL of the external chat completion API.
    #[serde(default = "default_chat_api_base_url")]
    pub chat_api_base_url: String,

    /// Bearer token for the chat completion API. When unset, `POST /api/chat`
    /// answers 503.
    #[serde(default)]
    pub chat_api_key: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_http_port() -> u16 {
    4000
}
fn default_max_upload_bytes() -> u64 {
    256 * 1024 * 1024
}
fn default_request_timeout_secs() -> u64 {
    300
}
fn default_chat_api_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            anyhow::bail!("HTTP_PORT must be non-zero");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be > 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if !self.chat_api_base_url.starts_with("http://")
            && !self.chat_api_base_url.starts_with("https://")
        {
            anyhow::bail!("CHAT_API_BASE_URL must be an http(s) URL");
        }
        if let Some(key) = &self.chat_api_key {
            if key.trim().is_empty() {
                anyhow::bail!("CHAT_API_KEY, when set, must not be empty");
            }
        }
        Ok(())
    }
}

impl Default for Config {
    /// Defaults without a chat API key, suitable for tests.
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            max_upload_bytes: default_max_upload_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
            chat_api_base_url: default_chat_api_base_url(),
            chat_api_key: None,
            log_level: default_log_level(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key is a credential; keep it out of debug output.
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("chat_api_base_url", &self.chat_api_base_url)
            .field(
                "chat_api_key",
                &self.chat_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_http_port(), 4000);
        assert_eq!(default_max_upload_bytes(), 268_435_456);
        assert_eq!(default_request_timeout_secs(), 300);
        assert_eq!(default_chat_api_base_url(), "https://api.openai.com/v1");
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_port() {
        let cfg = Config {
            http_port: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let cfg = Config {
            chat_api_base_url: "ftp://example.com".into(),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_api_key() {
        let cfg = Config {
            chat_api_key: Some("  ".into()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = Config {
            chat_api_key: Some("sk-very-secret".into()),
            ..Config::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("sk-very-secret"));
    }
}
