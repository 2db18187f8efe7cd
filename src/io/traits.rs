//! Core traits for import/export operations.
//!
//! Defines the [`ImportSource`] and [`ExportSink`] traits that format adapters
//! implement, and the [`Header`] that aligns records to columns.

use crate::models::Record;
use crate::{Error, Result};
use serde_json::Value;

/// Source of imported records.
///
/// Implementations read records from a specific format and yield them one at
/// a time.
pub trait ImportSource {
    /// Reads the next record from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O errors occur.
    fn next(&mut self) -> Result<Option<Record>>;

    /// Returns an estimate of the total number of records, if known.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Sink for exported records.
///
/// # Lifecycle
///
/// 1. Create sink with output destination
/// 2. Call `begin()` once with the header derived from the first record
/// 3. Call `write()` for each record, in store order
/// 4. Call `finalize()` to complete the export
pub trait ExportSink {
    /// Receives the column header before any record.
    ///
    /// # Errors
    ///
    /// Returns an error if writing the header fails.
    fn begin(&mut self, header: &Header) -> Result<()>;

    /// Writes a single record. `row` is the record's zero-based position.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not fit the header or I/O fails.
    fn write(&mut self, row: usize, record: &Record) -> Result<()>;

    /// Finalizes the export, writing any footers and flushing buffers.
    ///
    /// This method consumes the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if I/O fails.
    fn finalize(self: Box<Self>) -> Result<()>;
}

/// Ordered column names for tabular formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header(Vec<String>);

impl Header {
    /// Creates a header from column names.
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    /// Derives the header from a record's field names, in field order.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self(record.fields().map(String::from).collect())
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.0
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the header has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selects a record's values in column order.
    ///
    /// Fields outside the header are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the record lacks a column.
    pub fn align<'r>(&self, row: usize, record: &'r Record) -> Result<Vec<&'r Value>> {
        self.0
            .iter()
            .map(|column| {
                record.get(column).ok_or_else(|| Error::MissingField {
                    row,
                    field: column.clone(),
                })
            })
            .collect()
    }
}
