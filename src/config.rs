use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{ExportError, Result};
use crate::models::BoundaryPolicy;

/// Environment variable holding the account identifier
pub const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
/// Environment variable holding the auth secret
pub const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub twilio: TwilioConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub page_size: usize,
    pub skip_seen_boundary: bool,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            twilio: TwilioConfig {
                api_base_url: "https://api.twilio.com".to_string(),
                timeout_secs: 30,
            },
            export: ExportConfig {
                output_path: "twilio_sms_export.csv".to_string(),
                page_size: 1000,
                skip_seen_boundary: false,
                show_progress: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence.
    ///
    /// Values are not validated here; call [`AppConfig::validate`] once any
    /// overrides have been applied.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let config = Config::builder()
            // Start with default values
            .set_default("twilio.api_base_url", defaults.twilio.api_base_url)?
            .set_default("twilio.timeout_secs", defaults.twilio.timeout_secs)?
            .set_default("export.output_path", defaults.export.output_path)?
            .set_default("export.page_size", defaults.export.page_size as u64)?
            .set_default("export.skip_seen_boundary", defaults.export.skip_seen_boundary)?
            .set_default("export.show_progress", defaults.export.show_progress)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("sms_export").required(false))
            // Add environment variables with prefix, e.g. SMS_EXPORT__EXPORT__PAGE_SIZE
            .add_source(
                Environment::with_prefix("SMS_EXPORT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Validated by the caller once overrides are applied
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.twilio.api_base_url.starts_with("https://")
            || self.twilio.api_base_url.starts_with("http://"))
        {
            return Err(ExportError::InvalidConfig(format!(
                "api_base_url must be an http(s) URL, got {}",
                self.twilio.api_base_url
            )));
        }
        if self.twilio.timeout_secs == 0 {
            return Err(ExportError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.export.page_size == 0 {
            return Err(ExportError::InvalidConfig(
                "page_size must be greater than 0".to_string(),
            ));
        }
        if self.export.output_path.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "output_path cannot be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ExportError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ExportError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        Ok(())
    }

    /// Boundary handling selected by `export.skip_seen_boundary`
    #[must_use]
    pub const fn boundary_policy(&self) -> BoundaryPolicy {
        if self.export.skip_seen_boundary {
            BoundaryPolicy::SkipSeen
        } else {
            BoundaryPolicy::Compatible
        }
    }

    /// Output file as a path
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.export.output_path)
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

/// Account credentials for the provider API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl Credentials {
    #[must_use]
    pub const fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            account_sid,
            auth_token,
        }
    }

    /// Read credentials from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ExportError::MissingCredential(key))
        };

        Ok(Self::new(read(ACCOUNT_SID_VAR)?, read(AUTH_TOKEN_VAR)?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.twilio.api_base_url, "https://api.twilio.com");
        assert_eq!(config.export.output_path, "twilio_sms_export.csv");
        assert_eq!(config.export.page_size, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.export.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials::new("AC123".to_string(), "secret".to_string());
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("AC123"));
        assert!(!rendered.contains("secret"));
    }
}
