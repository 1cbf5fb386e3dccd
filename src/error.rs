//! Error types for the sms-history-export library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur while exporting message history.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A required credential was not present in the environment
    #[error("Missing credential: {0} must be set")]
    MissingCredential(&'static str),

    /// Transport-level HTTP failure (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("API error (status {status}{}): {message}", code_suffix(.code))]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider-specific error code, when the body carried one
        code: Option<i64>,
        /// Human readable message
        message: String,
    },

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid date format or window
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration sources could not be read or merged
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExportError {
    /// Short label used for metrics and structured logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "credentials",
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::Csv(_) => "csv",
            Self::Io(_) => "io",
            Self::InvalidDate(_) => "date",
            Self::InvalidConfig(_) | Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
        }
    }
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(", code {c}")).unwrap_or_default()
}

/// Convenience type alias for Result with ExportError
pub type Result<T> = std::result::Result<T, ExportError>;
