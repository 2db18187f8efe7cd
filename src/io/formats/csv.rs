//! CSV format adapter for import/export.
//!
//! The first row names the fields. Imported cells stay text; exported values
//! are rendered with [`cell_text`](super::cell_text).

use super::{cell_text, codec_error};
use crate::io::traits::{ExportSink, Header, ImportSource};
use crate::models::Record;
use crate::Result;
use serde_json::Value;
use std::io::{BufRead, Write};

/// CSV import source.
///
/// Each data row becomes a record mapping header name to cell text.
pub struct CsvImportSource<R: BufRead> {
    /// CSV reader.
    reader: csv::Reader<R>,
    /// Field names from the header row.
    headers: Vec<String>,
}

impl<R: BufRead> CsvImportSource<R> {
    /// Creates a new CSV import source.
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be read.
    pub fn new(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // Short and long rows are aligned by position
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| codec_error("read_csv_headers", e))?
            .iter()
            .map(String::from)
            .collect();

        Ok(Self {
            reader: csv_reader,
            headers,
        })
    }

    /// Field names read from the header row.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Maps a row onto the header. Missing trailing cells become empty text.
    fn parse_record(&self, row: &csv::StringRecord) -> Record {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cell = row.get(i).unwrap_or_default();
                (name.clone(), Value::String(cell.to_string()))
            })
            .collect()
    }
}

impl<R: BufRead> ImportSource for CsvImportSource<R> {
    fn next(&mut self) -> Result<Option<Record>> {
        let mut row = csv::StringRecord::new();

        let has_record = self
            .reader
            .read_record(&mut row)
            .map_err(|e| codec_error("read_csv", e))?;
        if !has_record {
            return Ok(None);
        }

        Ok(Some(self.parse_record(&row)))
    }
}

/// CSV export sink.
pub struct CsvExportSink<W: Write> {
    writer: csv::Writer<W>,
    header: Option<Header>,
}

impl<W: Write> CsvExportSink<W> {
    /// Creates a new CSV export sink.
    pub fn new(writer: W) -> Self {
        let csv_writer = csv::WriterBuilder::new()
            .has_headers(false) // We write headers manually
            .from_writer(writer);

        Self {
            writer: csv_writer,
            header: None,
        }
    }
}

impl<W: Write> ExportSink for CsvExportSink<W> {
    fn begin(&mut self, header: &Header) -> Result<()> {
        self.writer
            .write_record(header.columns())
            .map_err(|e| codec_error("write_csv_headers", e))?;
        self.header = Some(header.clone());
        Ok(())
    }

    fn write(&mut self, row: usize, record: &Record) -> Result<()> {
        let Some(header) = &self.header else {
            return Err(codec_error("write_csv", "header not written"));
        };
        let cells: Vec<_> = header
            .align(row, record)?
            .into_iter()
            .map(cell_text)
            .collect();

        self.writer
            .write_record(cells.iter().map(|c| c.as_bytes()))
            .map_err(|e| codec_error("write_csv", e))
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| codec_error("flush_csv", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_import_basic_csv() {
        let input = "id,name,age\n12345678,Anna,20\n87654321,Ben,31\n";
        let mut source = CsvImportSource::new(Cursor::new(input)).unwrap();
        assert_eq!(source.headers(), ["id", "name", "age"]);

        let first = source.next().unwrap().unwrap();
        assert_eq!(first.get("id"), Some(&json!("12345678")));
        assert_eq!(first.get("name"), Some(&json!("Anna")));
        // No coercion: numeric-looking cells stay text.
        assert_eq!(first.get("age"), Some(&json!("20")));

        let second = source.next().unwrap().unwrap();
        assert_eq!(second.name(), Some("Ben"));

        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_import_quoted_cells() {
        let input = "name,note\n\"Smith, Jo\",\"said \"\"hi\"\"\"\n";
        let mut source = CsvImportSource::new(Cursor::new(input)).unwrap();

        let record = source.next().unwrap().unwrap();
        assert_eq!(record.name(), Some("Smith, Jo"));
        assert_eq!(record.get("note"), Some(&json!("said \"hi\"")));
    }

    #[test]
    fn test_import_short_row_fills_empty_text() {
        let input = "id,name,age\n12345678,Anna\n";
        let mut source = CsvImportSource::new(Cursor::new(input)).unwrap();

        let record = source.next().unwrap().unwrap();
        assert_eq!(record.get("age"), Some(&json!("")));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_import_header_only() {
        let mut source = CsvImportSource::new(Cursor::new("id,name\n")).unwrap();
        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_export_csv() {
        let mut output = Vec::new();
        {
            let first = Record::new().with("id", "12345678").with("name", "Anna").with("age", 20);
            let second = Record::new()
                .with("name", "Ben, Jr")
                .with("age", 31)
                .with("id", "87654321")
                .with("extra", "dropped");

            let mut sink = CsvExportSink::new(&mut output);
            sink.begin(&Header::from_record(&first)).unwrap();
            sink.write(0, &first).unwrap();
            sink.write(1, &second).unwrap();
            Box::new(sink).finalize().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "id,name,age\n12345678,Anna,20\n87654321,\"Ben, Jr\",31\n"
        );
    }

    #[test]
    fn test_export_missing_column_fails() {
        let mut output = Vec::new();
        let first = Record::new().with("id", "1").with("name", "Anna");
        let second = Record::new().with("id", "2");

        let mut sink = CsvExportSink::new(&mut output);
        sink.begin(&Header::from_record(&first)).unwrap();
        sink.write(0, &first).unwrap();
        let err = sink.write(1, &second).unwrap_err();
        assert!(matches!(err, Error::MissingField { row: 1, .. }));
    }
}
