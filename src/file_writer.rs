//! CSV output for exported messages.
//!
//! The sink writes the header once, then one row per record as records
//! arrive. Columns: `Date Sent, From, To, Body`.

use crate::error::Result;
use crate::models::SmsRecord;
use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row of the export file
pub const CSV_HEADERS: [&str; 4] = ["Date Sent", "From", "To", "Body"];

/// Rendering of the `Date Sent` column, e.g. `2024-06-01 12:30:00+00:00`
pub const DATE_SENT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Incremental CSV writer for [`SmsRecord`]s
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    rows: u64,
}

impl CsvSink<BufWriter<File>> {
    /// Create (or truncate) `file_path` and write the header row.
    ///
    /// The file is closed when the sink is dropped, including on error paths.
    /// A partially written file is left in place.
    pub fn create(file_path: &Path) -> Result<Self> {
        let file = File::create(file_path)?;
        Self::from_writer(BufWriter::new(file))
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap any writer and write the header row
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(CSV_HEADERS)?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append one record
    pub fn write_record(&mut self, record: &SmsRecord) -> Result<()> {
        let date_sent = record.sent_at.format(DATE_SENT_FORMAT).to_string();
        self.writer.write_record([
            date_sent.as_str(),
            record.from.as_str(),
            record.to.as_str(),
            record.body.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (header excluded)
    #[must_use]
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush buffered rows and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        let mut inner = self.writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
        inner.flush()?;
        Ok(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(body: &str) -> SmsRecord {
        SmsRecord {
            sid: "SM1".to_string(),
            sent_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
            from: "+15550001111".to_string(),
            to: "+15552223333".to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        let sink = CsvSink::from_writer(Vec::new()).unwrap();
        let bytes = sink.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Date Sent,From,To,Body\n");
    }

    #[test]
    fn test_row_layout_and_quoting() {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.write_record(&sample("hi, \"you\"\nbye")).unwrap();
        assert_eq!(sink.rows(), 1);

        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            concat!(
                "Date Sent,From,To,Body\n",
                "2024-06-01 12:30:00+00:00,+15550001111,+15552223333,\"hi, \"\"you\"\"\nbye\"\n",
            )
        );
    }
}
