//! Backward cursor pagination over a [`MessageRepository`].
//!
//! The pager walks a window from its end towards its start. Each follow-up
//! request keeps the window start and moves the upper bound to the send time
//! of the oldest record seen so far. Paging stops when a request comes back
//! empty or ends on the same record as the previous page.
//!
//! Only one page is held in memory at a time and a page is requested only
//! after the previous one has been fully drained.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use crate::error::Result;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{BoundaryPolicy, DateWindow, ListQuery, SmsRecord};
use crate::repository::MessageRepository;

/// Default number of records requested per list call
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Oldest record of the most recent page
#[derive(Debug)]
struct Cursor {
    sid: String,
    sent_at: DateTime<Utc>,
    /// Ids already yielded whose send time equals `sent_at`
    seen_at_boundary: HashSet<String>,
}

impl Cursor {
    fn from_page(page: &[SmsRecord]) -> Option<Self> {
        let last = page.last()?;
        let seen_at_boundary = page
            .iter()
            .filter(|record| record.sent_at == last.sent_at)
            .map(|record| record.sid.clone())
            .collect();

        Some(Self {
            sid: last.sid.clone(),
            sent_at: last.sent_at,
            seen_at_boundary,
        })
    }
}

#[derive(Debug)]
enum Phase {
    Start,
    After(Cursor),
    Done,
}

/// Lazy, pull-based sequence of records in descending send order
pub struct MessagePager<'a, R: MessageRepository + ?Sized> {
    repo: &'a R,
    query: ListQuery,
    policy: BoundaryPolicy,
    metrics: MetricsCollector,
    phase: Phase,
    buffer: std::vec::IntoIter<SmsRecord>,
    pages: u64,
}

impl<'a, R: MessageRepository + ?Sized> MessagePager<'a, R> {
    /// Page through `window` with at most `page_size` records per call.
    ///
    /// `window.start < window.end` is the caller's responsibility.
    pub fn new(repo: &'a R, window: DateWindow, page_size: usize) -> Self {
        Self {
            repo,
            query: ListQuery::for_window(&window, page_size),
            policy: BoundaryPolicy::default(),
            metrics: MetricsCollector::default(),
            phase: Phase::Start,
            buffer: Vec::new().into_iter(),
            pages: 0,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    /// Number of list calls issued so far
    #[must_use]
    pub const fn pages_fetched(&self) -> u64 {
        self.pages
    }

    /// Next record, fetching another page when the current one is drained
    pub async fn next(&mut self) -> Result<Option<SmsRecord>> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Ok(Some(record));
            }
            if matches!(self.phase, Phase::Done) {
                return Ok(None);
            }
            self.advance().await?;
        }
    }

    /// Drain the remaining sequence into memory
    pub async fn collect_all(mut self) -> Result<Vec<SmsRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn advance(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Done => {}
            Phase::Start => {
                let page = self.request(self.query).await?;
                if let Some(cursor) = Cursor::from_page(&page) {
                    self.phase = Phase::After(cursor);
                    self.buffer = page.into_iter();
                }
            }
            Phase::After(cursor) => {
                let page = self.request(self.query.older_than(cursor.sent_at)).await?;
                let Some(mut next_cursor) = Cursor::from_page(&page) else {
                    debug!(pages = self.pages, "Empty page, pagination finished");
                    return Ok(());
                };
                if next_cursor.sid == cursor.sid {
                    debug!(
                        sid = %cursor.sid,
                        "Page ended on previous boundary record, pagination finished"
                    );
                    return Ok(());
                }

                let page = match self.policy {
                    BoundaryPolicy::Compatible => page,
                    BoundaryPolicy::SkipSeen => {
                        if next_cursor.sent_at == cursor.sent_at {
                            next_cursor
                                .seen_at_boundary
                                .extend(cursor.seen_at_boundary.iter().cloned());
                        }
                        let before = page.len();
                        let page: Vec<SmsRecord> = page
                            .into_iter()
                            .filter(|record| !cursor.seen_at_boundary.contains(&record.sid))
                            .collect();
                        if page.len() < before {
                            debug!(
                                skipped = before - page.len(),
                                "Dropped records already yielded at boundary"
                            );
                        }
                        page
                    }
                };

                self.phase = Phase::After(next_cursor);
                self.buffer = page.into_iter();
            }
        }
        Ok(())
    }

    async fn request(&mut self, query: ListQuery) -> Result<Vec<SmsRecord>> {
        let timer = OperationTimer::new("list_messages");
        let result = self.repo.list_messages(&query).await;
        let duration = timer.finish();
        self.pages += 1;

        match &result {
            Ok(page) => {
                debug!(
                    page = self.pages,
                    records = page.len(),
                    sent_before = %query.sent_before,
                    "Fetched page"
                );
                self.metrics.record_page_fetch(page.len(), duration, true);
            }
            Err(e) => {
                debug!(page = self.pages, error = %e, "Page fetch failed");
                self.metrics.record_page_fetch(0, duration, false);
            }
        }
        result
    }
}
