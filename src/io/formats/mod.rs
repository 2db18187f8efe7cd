//! Format adapters for import/export.
//!
//! Each format implements [`ImportSource`] and [`ExportSink`].

pub mod csv;
pub mod json;
pub mod xlsx;

use crate::{Error, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::io::{BufRead, Seek, Write};
use std::path::Path;
use std::str::FromStr;

use super::traits::{ExportSink, ImportSource};

/// Supported file formats for import/export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Comma separated values with a header row.
    Csv,
    /// Office Open XML spreadsheet.
    Xlsx,
    /// JSON array of objects.
    Json,
}

impl Format {
    /// Returns every supported format.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Xlsx, Self::Json]
    }

    /// Comma separated names of the supported formats.
    #[must_use]
    pub fn supported() -> String {
        Self::all()
            .iter()
            .map(Self::extension)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the extension is missing or not
    /// recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat {
                format: s.to_string(),
                supported: Self::supported(),
            }),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Creates an import source for the given format and reader.
///
/// # Errors
///
/// Returns an error if the source cannot read its header or workbook.
pub fn create_import_source<'a, R: BufRead + Seek + 'a>(
    reader: R,
    format: Format,
) -> Result<Box<dyn ImportSource + 'a>> {
    match format {
        Format::Csv => Ok(Box::new(csv::CsvImportSource::new(reader)?)),
        Format::Xlsx => Ok(Box::new(xlsx::XlsxImportSource::new(reader)?)),
        Format::Json => Ok(Box::new(json::JsonImportSource::new(reader))),
    }
}

/// Creates an export sink for the given format and writer.
#[must_use]
pub fn create_export_sink<'a, W: Write + 'a>(writer: W, format: Format) -> Box<dyn ExportSink + 'a> {
    match format {
        Format::Csv => Box::new(csv::CsvExportSink::new(writer)),
        Format::Xlsx => Box::new(xlsx::XlsxExportSink::new(writer)),
        Format::Json => Box::new(json::JsonExportSink::new(writer)),
    }
}

/// Renders a value as a text cell.
///
/// Nulls become empty cells and nested values compact JSON.
pub(crate) fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Wraps a codec error as an operation failure.
pub(crate) fn codec_error(operation: &str, cause: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: cause.to_string(),
    }
}
