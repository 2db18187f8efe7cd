//! JSON format adapter for import/export.
//!
//! Exports a pretty-printed array of objects. Imports either an array of
//! objects or newline-delimited objects (NDJSON/JSONL).

use super::codec_error;
use crate::io::traits::{ExportSink, Header, ImportSource};
use crate::models::Record;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// JSON import source.
///
/// Automatically detects and handles both formats:
/// - **Array**: A JSON array of objects `[{...}, {...}]`
/// - **NDJSON/JSONL**: One JSON object per line
pub struct JsonImportSource<R: BufRead> {
    reader: R,
    /// Records parsed but not yet returned.
    buffer: VecDeque<Record>,
    /// Whether we've detected and started parsing.
    started: bool,
    /// Whether the document is a single array.
    array_mode: bool,
    /// Line number for error reporting.
    line_number: usize,
}

impl<R: BufRead> JsonImportSource<R> {
    /// Creates a new JSON import source.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: VecDeque::new(),
            started: false,
            array_mode: false,
            line_number: 0,
        }
    }

    /// Reads up to the first non-blank line to detect the layout.
    ///
    /// Returns `false` for an empty document.
    fn detect_format(&mut self) -> Result<bool> {
        self.started = true;

        let mut first_line = String::new();
        loop {
            first_line.clear();
            if self.read_line(&mut first_line)? == 0 {
                return Ok(false);
            }
            if !first_line.trim().is_empty() {
                break;
            }
        }

        if first_line.trim_start().starts_with('[') {
            self.array_mode = true;
            let mut remaining = String::new();
            self.reader
                .read_to_string(&mut remaining)
                .map_err(|e| codec_error("read_json", e))?;
            let full_content = format!("{first_line}{remaining}");

            let values: Vec<Value> = serde_json::from_str(&full_content)
                .map_err(|e| Error::InvalidInput(format!("Failed to parse JSON array: {e}")))?;
            self.buffer = values
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    Record::try_from(value)
                        .map_err(|e| Error::InvalidInput(format!("Element {i}: {e}")))
                })
                .collect::<Result<_>>()?;
        } else {
            let record = self.parse_line(first_line.trim())?;
            self.buffer.push_back(record);
        }

        Ok(true)
    }

    fn read_line(&mut self, line: &mut String) -> Result<usize> {
        let bytes_read = self
            .reader
            .read_line(line)
            .map_err(|e| codec_error("read_json", e))?;
        if bytes_read > 0 {
            self.line_number += 1;
        }
        Ok(bytes_read)
    }

    fn parse_line(&self, line: &str) -> Result<Record> {
        let value: Value = serde_json::from_str(line).map_err(|e| {
            Error::InvalidInput(format!(
                "Line {}: Failed to parse JSON: {e}",
                self.line_number
            ))
        })?;
        Record::try_from(value)
            .map_err(|e| Error::InvalidInput(format!("Line {}: {e}", self.line_number)))
    }
}

impl<R: BufRead> ImportSource for JsonImportSource<R> {
    fn next(&mut self) -> Result<Option<Record>> {
        if !self.started && !self.detect_format()? {
            return Ok(None);
        }

        if let Some(record) = self.buffer.pop_front() {
            return Ok(Some(record));
        }
        if self.array_mode {
            return Ok(None);
        }

        // NDJSON mode: read the next non-blank line
        let mut line = String::new();
        loop {
            line.clear();
            if self.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if !line.trim().is_empty() {
                break;
            }
        }

        self.parse_line(line.trim()).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        self.array_mode.then_some(self.buffer.len())
    }
}

/// JSON export sink.
///
/// Buffers records and writes them as one pretty-printed array, keeping every
/// field of every record regardless of the header.
pub struct JsonExportSink<W: Write> {
    writer: W,
    records: Vec<Value>,
}

impl<W: Write> JsonExportSink<W> {
    /// Creates a new JSON export sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }
}

impl<W: Write> ExportSink for JsonExportSink<W> {
    fn begin(&mut self, _header: &Header) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, _row: usize, record: &Record) -> Result<()> {
        self.records.push(Value::Object(record.as_map().clone()));
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.records)
            .map_err(|e| codec_error("write_json", e))?;
        writeln!(self.writer).map_err(|e| codec_error("write_json", e))?;
        self.writer
            .flush()
            .map_err(|e| codec_error("flush_json", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_import_array() {
        let input = r#"[
            {"id": "12345678", "name": "Anna", "age": 20},
            {"id": "87654321", "name": "Ben", "age": 31, "club": "chess"}
        ]"#;
        let mut source = JsonImportSource::new(Cursor::new(input));

        let first = source.next().unwrap().unwrap();
        assert_eq!(first.get("age"), Some(&json!(20)));
        assert_eq!(source.size_hint(), Some(1));

        let second = source.next().unwrap().unwrap();
        assert_eq!(second.get("club"), Some(&json!("chess")));

        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_import_ndjson() {
        let input = "{\"name\": \"Anna\"}\n\n{\"name\": \"Ben\", \"age\": 31}\n";
        let mut source = JsonImportSource::new(Cursor::new(input));

        assert_eq!(source.next().unwrap().unwrap().name(), Some("Anna"));
        assert_eq!(source.next().unwrap().unwrap().name(), Some("Ben"));
        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_import_empty_document() {
        let mut source = JsonImportSource::new(Cursor::new("  \n"));
        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_import_rejects_non_objects() {
        let mut source = JsonImportSource::new(Cursor::new("[1, 2]"));
        let err = source.next().unwrap_err();
        assert!(err.to_string().contains("Element 0"));
    }

    #[test]
    fn test_import_reports_line_number() {
        let input = "{\"name\": \"Anna\"}\n{broken\n";
        let mut source = JsonImportSource::new(Cursor::new(input));
        source.next().unwrap();
        let err = source.next().unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_export_keeps_heterogeneous_fields() {
        let mut output = Vec::new();
        {
            let first = Record::new().with("name", "Anna");
            let second = Record::new().with("name", "Ben").with("club", "chess");

            let mut sink = JsonExportSink::new(&mut output);
            sink.begin(&Header::from_record(&first)).unwrap();
            sink.write(0, &first).unwrap();
            sink.write(1, &second).unwrap();
            Box::new(sink).finalize().unwrap();
        }

        let parsed: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            parsed,
            json!([{"name": "Anna"}, {"name": "Ben", "club": "chess"}])
        );
    }
}
