//! Date helpers for building the export window.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::{ExportError, Result};
use crate::models::DateWindow;

/// Month and day the default window starts on
const DEFAULT_START_MONTH: u32 = 6;
const DEFAULT_START_DAY: u32 = 1;

/// Which end of the window a command-line date describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Inclusive start: a bare date means that day's midnight
    Start,
    /// Exclusive end: a bare date means the following midnight, so the
    /// whole named day is exported
    End,
}

/// Default window: June 1 of the current year at local midnight until `now`.
pub fn default_window<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<DateWindow> {
    let tz = now.timezone();
    let start_date = NaiveDate::from_ymd_opt(now.year(), DEFAULT_START_MONTH, DEFAULT_START_DAY)
        .ok_or_else(|| ExportError::InvalidDate(format!("June 1 of {}", now.year())))?;
    let start = local_midnight(&tz, start_date)?;

    Ok(DateWindow::new(start, now.with_timezone(&Utc)))
}

/// Parse `YYYY-MM-DD` (interpreted in `tz`) or a full RFC 3339 timestamp.
pub fn parse_date_bound<Tz: TimeZone>(input: &str, tz: &Tz, bound: Bound) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        ExportError::InvalidDate(format!(
            "{input}: expected YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })?;

    match bound {
        Bound::Start => local_midnight(tz, date),
        Bound::End => {
            let next = date
                .checked_add_signed(Duration::days(1))
                .ok_or_else(|| ExportError::InvalidDate(format!("{input}: out of range")))?;
            local_midnight(tz, next)
        }
    }
}

/// Midnight of `date` in `tz`; the earlier instant if the wall clock is
/// ambiguous, the first valid hour if midnight is skipped by a DST change.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
    (0..3)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ExportError::InvalidDate(format!("no local midnight on {date}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_default_window_starts_june_first() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 9, 14, 10, 0, 0).unwrap();

        let window = default_window(&now).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 5, 31, 22, 0, 0).unwrap());
        assert_eq!(window.end, now.with_timezone(&Utc));
    }

    #[test]
    fn test_parse_end_date_is_exclusive_next_midnight() {
        let end = parse_date_bound("2024-06-30", &Utc, Bound::End).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
    }
}
