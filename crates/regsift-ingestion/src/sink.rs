//! Streaming CSV record sink.
//!
//! One row per harvested document, appended and flushed as it completes, so
//! an interrupted run still leaves a usable file. Sink failures are fatal to
//! the run: partial output is acceptable, a silently broken writer is not.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::models::DocumentDescriptor;
use regsift_common::error::RegsiftError;

/// Fixed output column order; stable across runs.
pub const OUTPUT_COLUMNS: [&str; 5] =
    ["document_id", "title", "docket_id", "abstract", "document_text"];

pub struct CsvSink {
    writer: Writer<File>,
}

impl CsvSink {
    /// Creates (or truncates) the output file and writes the header row.
    pub fn create(path: &Path) -> Result<Self, RegsiftError> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(OUTPUT_COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Appends one row in the fixed column order and flushes it.
    pub fn write_record(
        &mut self,
        descriptor: &DocumentDescriptor,
        document_text: &str,
    ) -> Result<(), RegsiftError> {
        self.writer.write_record([
            descriptor.id.as_str(),
            descriptor.title.as_str(),
            descriptor.docket_id.as_str(),
            descriptor.abstract_or_default(),
            document_text,
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> DocumentDescriptor {
        DocumentDescriptor {
            id: id.to_string(),
            title: format!("Title {id}"),
            docket_id: "DOCKET-1".to_string(),
            abstract_text: None,
        }
    }

    #[test]
    fn test_header_and_column_order_are_stable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.csv");
        let _sink = CsvSink::create(&path).expect("create sink");

        let content = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(
            content.lines().next(),
            Some("document_id,title,docket_id,abstract,document_text")
        );
    }

    #[test]
    fn test_rows_flush_as_they_are_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path).expect("create sink");

        sink.write_record(&descriptor("d1"), "first body")
            .expect("write d1");
        // Readable before the sink is dropped: streaming append, not batch.
        let content = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(content.lines().count(), 2);

        sink.write_record(&descriptor("d2"), "second body")
            .expect("write d2");
        let content = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("d2,Title d2,DOCKET-1,No abstract available,second body"));
    }
}
