use std::path::Path;
use tracing::{error, info};

use crate::error::Result;
use crate::file_writer::CsvSink;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{BoundaryPolicy, DateWindow, ExportSummary};
use crate::pager::{MessagePager, DEFAULT_PAGE_SIZE};
use crate::progress::ExportProgress;
use crate::repository::MessageRepository;

/// Exports a date window from a repository into a CSV file
pub struct ExportService<R: MessageRepository> {
    repository: R,
    page_size: usize,
    policy: BoundaryPolicy,
    metrics: MetricsCollector,
}

impl<R: MessageRepository> ExportService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            page_size: DEFAULT_PAGE_SIZE,
            policy: BoundaryPolicy::default(),
            metrics: MetricsCollector::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Write every record of `window` to `output_path`.
    ///
    /// An empty window still produces a file with the header row. Any
    /// repository or file error aborts the run; rows already written stay
    /// in the file.
    pub async fn export(
        &self,
        window: DateWindow,
        output_path: &Path,
        progress: &ExportProgress,
    ) -> Result<ExportSummary> {
        let timer = OperationTimer::new("export");
        info!(
            start = %window.start,
            end = %window.end,
            page_size = self.page_size,
            policy = ?self.policy,
            path = %output_path.display(),
            "Starting export"
        );

        let result = self.write_window(window, output_path, progress).await;
        let duration = timer.finish();

        match result {
            Ok(summary) => {
                progress.finish();
                self.metrics.record_export(summary.count, duration);
                info!(
                    count = summary.count,
                    pages = summary.pages,
                    duration_ms = duration.as_millis(),
                    "Export finished"
                );
                Ok(summary)
            }
            Err(e) => {
                progress.finish();
                self.metrics.record_error(e.kind(), "export");
                error!(error = %e, rows = progress.count(), "Export aborted");
                Err(e)
            }
        }
    }

    async fn write_window(
        &self,
        window: DateWindow,
        output_path: &Path,
        progress: &ExportProgress,
    ) -> Result<ExportSummary> {
        let mut sink = CsvSink::create(output_path)?;
        let mut pager = MessagePager::new(&self.repository, window, self.page_size)
            .with_policy(self.policy)
            .with_metrics(self.metrics);

        while let Some(record) = pager.next().await? {
            sink.write_record(&record)?;
            progress.inc();
        }

        let count = sink.rows();
        sink.finish()?;

        Ok(ExportSummary {
            path: output_path.to_path_buf(),
            count,
            pages: pager.pages_fetched(),
        })
    }
}
