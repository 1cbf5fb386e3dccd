use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}: {pos} msg [{elapsed}]";

/// Running count of exported messages, drawn as a spinner on stderr
pub struct ExportProgress {
    bar: ProgressBar,
}

impl ExportProgress {
    /// Visible spinner labelled "Exporting messages"
    #[must_use]
    pub fn spinner() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message("Exporting messages");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Counts without drawing anything
    #[must_use]
    pub fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.bar.position()
    }

    /// Stop the spinner, leaving the final count on screen
    pub fn finish(&self) {
        self.bar.finish_with_message("Export complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_counts() {
        let progress = ExportProgress::hidden();
        for _ in 0..3 {
            progress.inc();
        }
        progress.finish();
        assert_eq!(progress.count(), 3);
    }
}
