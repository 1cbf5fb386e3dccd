use metrics::{counter, histogram};
use std::time::Duration;

/// Metric names emitted during an export.
///
/// Nothing is recorded unless the embedding application installs a
/// `metrics` recorder; without one every call is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    // Fetch metrics
    pub pages_fetched_total: &'static str,
    pub page_fetch_duration: &'static str,
    pub messages_fetched_total: &'static str,

    // Export metrics
    pub messages_exported_total: &'static str,
    pub export_duration: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            pages_fetched_total: "sms_export_pages_fetched_total",
            page_fetch_duration: "sms_export_page_fetch_duration_seconds",
            messages_fetched_total: "sms_export_messages_fetched_total",

            messages_exported_total: "sms_export_messages_exported_total",
            export_duration: "sms_export_duration_seconds",

            errors_total: "sms_export_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Record one list call against the provider.
    ///
    /// A failed call only shows up under `status = "error"` here; the error
    /// itself is counted once by whoever aborts on it.
    pub fn record_page_fetch(&self, records: usize, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };

        counter!(self.pages_fetched_total, "status" => status).increment(1);
        histogram!(self.page_fetch_duration, "status" => status).record(duration.as_secs_f64());
        if success {
            counter!(self.messages_fetched_total).increment(records as u64);
        }
    }

    /// Record a finished export
    pub fn record_export(&self, count: u64, duration: Duration) {
        counter!(self.messages_exported_total).increment(count);
        histogram!(self.export_duration).record(duration.as_secs_f64());
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &str, operation: &str) {
        counter!(
            self.errors_total,
            "type" => error_type.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }
}
