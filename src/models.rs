//! Data models for message export
//!
//! This module contains the data structures shared by the repository, the
//! pager and the CSV writer.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One SMS message as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsRecord {
    /// Provider message identifier (`SM...`)
    pub sid: String,
    /// Timestamp when the message was sent
    pub sent_at: DateTime<Utc>,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Message text content
    pub body: String,
}

/// Half-open time window `[start, end)` bounding an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Start of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End of the window (exclusive)
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Create a window from its bounds. Ordering is not checked here.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `instant` falls inside `[start, end)`
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Arguments of a single "list messages" call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Lower bound on the sent date (inclusive)
    pub sent_after: DateTime<Utc>,
    /// Upper bound on the sent date (exclusive)
    pub sent_before: DateTime<Utc>,
    /// Maximum number of records to return
    pub limit: usize,
}

impl ListQuery {
    /// The first query for a window
    #[must_use]
    pub const fn for_window(window: &DateWindow, limit: usize) -> Self {
        Self {
            sent_after: window.start,
            sent_before: window.end,
            limit,
        }
    }

    /// Same query with the upper bound moved back to `sent_before`
    #[must_use]
    pub const fn older_than(self, sent_before: DateTime<Utc>) -> Self {
        Self { sent_before, ..self }
    }
}

/// How records sharing the cursor timestamp are handled between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Only stop when a page ends on the previous page's last record.
    /// Records tied with the cursor timestamp can be yielded again.
    #[default]
    Compatible,
    /// Also drop records already yielded at the cursor timestamp
    SkipSeen,
}

/// Result of a completed export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File the rows were written to
    pub path: PathBuf,
    /// Number of data rows written
    pub count: u64,
    /// Number of list calls issued
    pub pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let window = DateWindow::new(start, end);

        assert!(window.contains(start));
        assert!(!window.contains(end));
        assert!(window.contains(end - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_older_than_keeps_start_and_limit() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let cursor = Utc.with_ymd_and_hms(2024, 6, 15, 8, 30, 0).unwrap();

        let query = ListQuery::for_window(&DateWindow::new(start, end), 50).older_than(cursor);
        assert_eq!(query.sent_after, start);
        assert_eq!(query.sent_before, cursor);
        assert_eq!(query.limit, 50);
    }
}
