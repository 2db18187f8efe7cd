//! Record export service.
//!
//! Orchestrates record export to the supported formats.

use crate::io::formats::{Format, create_export_sink};
use crate::io::traits::{ExportSink, Header};
use crate::models::Record;
use crate::storage::write_atomic;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tracing::instrument;

/// Options for record export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// File format to export to. Detected from the file extension when unset.
    pub format: Option<Format>,
}

impl ExportOptions {
    /// Creates export options with the given format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Resolves the format for a destination path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] when no format is set and the
    /// extension is not recognized.
    pub fn resolve_format(&self, path: &Path) -> Result<Format> {
        self.format.map_or_else(|| Format::from_path(path), Ok)
    }
}

/// Result of an export operation.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Number of records exported.
    pub exported: usize,
    /// Format used for export.
    pub format: Format,
    /// Output path (if file export).
    pub output_path: Option<String>,
}

impl ExportResult {
    /// Creates a new export result.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            exported: 0,
            format,
            output_path: None,
        }
    }
}

/// Service for exporting records to external formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportService;

impl ExportService {
    /// Creates a new export service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Exports records to a file.
    ///
    /// The file is rendered in memory and then written through a temporary
    /// sibling that is renamed into place, so a failed export leaves no
    /// partial file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is unsupported, `records` is empty, a
    /// record lacks a header column, or the file cannot be written.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn export_to_file(
        &self,
        records: &[Record],
        path: &Path,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let format = options.resolve_format(path)?;

        let mut buffer = Vec::new();
        let mut result = self.export_to_writer(records, &mut buffer, format)?;
        write_atomic(path, &buffer)?;

        result.output_path = Some(path.display().to_string());
        tracing::info!(
            exported = result.exported,
            format = %format,
            path = %path.display(),
            "export completed"
        );
        Ok(result)
    }

    /// Exports records to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if `records` is empty or writing fails.
    pub fn export_to_writer<W: Write>(
        &self,
        records: &[Record],
        writer: W,
        format: Format,
    ) -> Result<ExportResult> {
        let mut sink = create_export_sink(writer, format);
        let exported = self.export_to_sink(records, sink.as_mut())?;
        sink.finalize()?;
        Ok(ExportResult {
            exported,
            ..ExportResult::new(format)
        })
    }

    /// Exports records to a sink.
    ///
    /// The header is derived from the first record's fields. Returns the
    /// number of records written; the sink is left for the caller to
    /// finalize.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToExport`] if `records` is empty, or the sink's
    /// error if a record cannot be written.
    pub fn export_to_sink(
        &self,
        records: &[Record],
        sink: &mut dyn ExportSink,
    ) -> Result<usize> {
        let first = records.first().ok_or(Error::NothingToExport)?;
        let header = Header::from_record(first);
        sink.begin(&header)?;

        for (row, record) in records.iter().enumerate() {
            sink.write(row, record)?;
        }

        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn records() -> Vec<Record> {
        vec![
            Record::new()
                .with("id", "12345678")
                .with("name", "Anna")
                .with("age", 20),
            Record::new()
                .with("id", "87654321")
                .with("name", "Ben")
                .with("age", 31),
        ]
    }

    #[test]
    fn test_export_options_resolve_format() {
        let options = ExportOptions::default();
        assert_eq!(
            options.resolve_format(Path::new("out.csv")).unwrap(),
            Format::Csv
        );

        let options = ExportOptions::default().with_format(Format::Json);
        assert_eq!(
            options.resolve_format(Path::new("out.txt")).unwrap(),
            Format::Json
        );
    }

    #[test]
    fn test_export_empty_fails() {
        let service = ExportService::new();
        let err = service
            .export_to_writer(&[], Vec::new(), Format::Csv)
            .unwrap_err();
        assert!(matches!(err, Error::NothingToExport));
    }

    #[test]
    fn test_export_to_sink_counts_records() {
        let mut output = Vec::new();
        let mut sink = crate::io::formats::csv::CsvExportSink::new(&mut output);
        let exported = ExportService::new()
            .export_to_sink(&records(), &mut sink)
            .unwrap();
        assert_eq!(exported, 2);
        Box::new(sink).finalize().unwrap();
        assert!(String::from_utf8(output).unwrap().starts_with("id,name,age\n"));
    }

    #[test]
    fn test_export_to_writer_reports_format() {
        for format in Format::all() {
            let result = ExportService::new()
                .export_to_writer(&records(), Vec::new(), *format)
                .unwrap();
            assert_eq!(result.format, *format);
            assert_eq!(result.exported, 2);
        }
    }

    #[test]
    fn test_export_to_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.json");

        let result = ExportService::new()
            .export_to_file(&records(), &path, &ExportOptions::default())
            .unwrap();
        assert_eq!(result.exported, 2);
        assert_eq!(result.format, Format::Json);

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[1], json!({"id": "87654321", "name": "Ben", "age": 31}));
    }

    #[test]
    fn test_failed_export_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.csv");
        let mut rows = records();
        rows[1].remove("age");

        let err = ExportService::new()
            .export_to_file(&rows, &path, &ExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingField { row: 1, .. }));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unsupported_extension_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.yaml");

        let err = ExportService::new()
            .export_to_file(&records(), &path, &ExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }
}
