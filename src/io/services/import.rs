//! Record import service.
//!
//! Orchestrates record import from the supported formats. Importers never
//! validate; callers re-validate explicitly.

use crate::io::formats::{Format, create_import_source};
use crate::io::traits::ImportSource;
use crate::models::Record;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;
use tracing::instrument;

/// Options for record import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// File format to import from. Detected from the file extension when unset.
    pub format: Option<Format>,
}

impl ImportOptions {
    /// Creates import options with the given format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Resolves the format for a source path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] when no format is set and the
    /// extension is not recognized.
    pub fn resolve_format(&self, path: &Path) -> Result<Format> {
        self.format.map_or_else(|| Format::from_path(path), Ok)
    }
}

/// Result of an import operation.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// Records read from the source, in source order.
    pub records: Vec<Record>,
    /// Format used for import.
    pub format: Format,
    /// Source path (if file import).
    pub source_path: Option<String>,
}

impl ImportResult {
    /// Number of records read.
    #[must_use]
    pub fn imported(&self) -> usize {
        self.records.len()
    }

    /// Returns whether any records were read.
    #[must_use]
    pub fn has_imports(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Service for importing records from external sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportService;

impl ImportService {
    /// Creates a new import service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Imports records from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is unsupported, the file cannot be
    /// opened, or its contents cannot be decoded.
    #[instrument(skip(self))]
    pub fn import_from_file(&self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let format = options.resolve_format(path)?;

        let file = File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_import_file".to_string(),
            cause: e.to_string(),
        })?;

        let mut result = self.import_from_reader(BufReader::new(file), format)?;
        result.source_path = Some(path.display().to_string());
        tracing::info!(
            imported = result.imported(),
            format = %format,
            path = %path.display(),
            "import completed"
        );
        Ok(result)
    }

    /// Imports records from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents cannot be decoded.
    pub fn import_from_reader<R: BufRead + Seek>(
        &self,
        reader: R,
        format: Format,
    ) -> Result<ImportResult> {
        let mut source = create_import_source(reader, format)?;
        let records = self.import_from_source(source.as_mut())?;
        Ok(ImportResult {
            records,
            format,
            source_path: None,
        })
    }

    /// Drains a source into a list of records.
    ///
    /// # Errors
    ///
    /// Returns the source's error for the first record that cannot be read.
    pub fn import_from_source(&self, source: &mut dyn ImportSource) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(source.size_hint().unwrap_or_default());
        while let Some(record) = source.next()? {
            records.push(record);
        }
        tracing::debug!(count = records.len(), "drained import source");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_import_csv_keeps_text() {
        let input = "id,name,age\n12345678,Anna,20\n";
        let result = ImportService::new()
            .import_from_reader(Cursor::new(input), Format::Csv)
            .unwrap();

        assert_eq!(result.imported(), 1);
        assert_eq!(result.format, Format::Csv);
        assert_eq!(result.records[0].get("age"), Some(&json!("20")));
        assert!(result.source_path.is_none());
    }

    #[test]
    fn test_import_json_keeps_native_types() {
        let input = r#"[{"id": "12345678", "name": "Anna", "age": 20}]"#;
        let result = ImportService::new()
            .import_from_reader(Cursor::new(input), Format::Json)
            .unwrap();

        assert_eq!(result.records[0].get("age"), Some(&json!(20)));
    }

    #[test]
    fn test_import_from_file_detects_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(&path, "name,major\nAnna,Math\nBen,Art\n").unwrap();

        let result = ImportService::new()
            .import_from_file(&path, &ImportOptions::default())
            .unwrap();
        assert_eq!(result.imported(), 2);
        assert!(result.has_imports());
        assert_eq!(result.source_path, Some(path.display().to_string()));
    }

    #[test]
    fn test_import_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = ImportService::new()
            .import_from_file(&dir.path().join("absent.json"), &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_import_unsupported_extension() {
        let err = ImportService::new()
            .import_from_file(Path::new("students.yaml"), &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("students.txt");
        std::fs::write(&path, r#"[{"name": "Anna"}]"#).unwrap();

        let options = ImportOptions::default().with_format(Format::Json);
        let result = ImportService::new().import_from_file(&path, &options).unwrap();
        assert_eq!(result.format, Format::Json);
        assert_eq!(result.imported(), 1);
    }
}
