use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::Credentials;
use crate::models::DateWindow;

/// Upper bound accepted for `--page-size`
pub const MAX_PAGE_SIZE: usize = 100_000;

#[allow(clippy::expect_used)]
fn account_sid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^AC[0-9a-fA-F]{32}$").expect("static pattern compiles"))
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate an account identifier (`AC` followed by 32 hex digits)
    pub fn validate_account_sid(sid: &str) -> Result<()> {
        if sid.trim().is_empty() {
            return Err(anyhow!("Account SID cannot be empty"));
        }

        if !account_sid_pattern().is_match(sid) {
            return Err(anyhow!(
                "Account SID must be 'AC' followed by 32 hexadecimal characters"
            ));
        }

        Ok(())
    }

    /// Validate the auth secret
    pub fn validate_auth_token(token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(anyhow!("Auth token cannot be empty"));
        }

        if token.chars().any(char::is_whitespace) {
            return Err(anyhow!("Auth token contains whitespace"));
        }

        Ok(())
    }

    /// Validate both halves of a credential pair
    pub fn validate_credentials(credentials: &Credentials) -> Result<()> {
        Self::validate_account_sid(&credentials.account_sid)?;
        Self::validate_auth_token(&credentials.auth_token)
    }

    /// Validate a user supplied export window
    pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        if start >= end {
            return Err(anyhow!("Start date ({start}) must be before end date ({end})"));
        }

        if end > Utc::now() {
            tracing::warn!(%end, "End date is in the future");
        }

        // Warn about very large date ranges
        let days = (end - start).num_days();
        if days > 365 * 5 {
            tracing::warn!(
                "Large date range ({} days / {:.1} years) will take many list calls",
                days,
                days as f64 / 365.0
            );
        }

        Ok(())
    }

    /// Validate the window an export will run over.
    ///
    /// Bounds given on the command line must be ordered. The default window
    /// starts on June 1, so earlier in the year it is empty: the export still
    /// runs and writes a header-only file.
    pub fn validate_export_window(window: &DateWindow, user_supplied: bool) -> Result<()> {
        if user_supplied {
            return Self::validate_window(window.start, window.end);
        }

        if window.start >= window.end {
            tracing::warn!(
                start = %window.start,
                end = %window.end,
                "Default window starts after now, no messages will be exported"
            );
        }

        Ok(())
    }

    /// Validate records requested per list call
    pub fn validate_page_size(page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(anyhow!("Page size must be greater than 0"));
        }

        if page_size > MAX_PAGE_SIZE {
            return Err(anyhow!("Page size too large (max {MAX_PAGE_SIZE})"));
        }

        Ok(())
    }

    /// Validate the export file path
    pub fn validate_output_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(anyhow!("Output path cannot be empty"));
        }

        // Check path length
        if path_str.len() > 4096 {
            return Err(anyhow!("Output path too long (max 4096 characters)"));
        }

        if path.is_dir() {
            return Err(anyhow!("Output path is a directory: {path:?}"));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(anyhow!("Output directory does not exist: {parent:?}"));
            }
        }

        Ok(())
    }
}
