//! SMS History Export
//!
//! A Rust library for exporting SMS message history from the Twilio
//! Messages API into a CSV file.
//!
//! # Features
//!
//! - Backward cursor pagination over a date window
//! - Incremental CSV output (`Date Sent, From, To, Body`)
//! - Progress reporting and export summary
//! - Layered configuration (defaults, files, environment)

/// Configuration and credential loading
pub mod config;
/// Error types
pub mod error;
/// CSV output
pub mod file_writer;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Backward pagination over the provider API
pub mod pager;
/// Console progress reporting
pub mod progress;
/// Repository pattern for data access
pub mod repository;
/// Export orchestration
pub mod service;
/// Date window helpers
pub mod utils;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use crate::config::{AppConfig, Credentials};
pub use crate::error::{ExportError, Result};
pub use crate::models::{BoundaryPolicy, DateWindow, ExportSummary, ListQuery, SmsRecord};
pub use crate::pager::MessagePager;
pub use crate::repository::{MessageRepository, TwilioMessageRepo};
pub use crate::service::ExportService;
