//! Loose record store.
//!
//! Holds imported rows as ordered field mappings and provides validation,
//! name search, stable sorting and exchange with CSV, XLSX and JSON files.

use crate::io::{
    ExportOptions, ExportResult, ExportService, Format, ImportOptions, ImportResult,
    ImportService, RecordValidator,
};
use crate::models::{Record, compare_values, kind_name};
use crate::{Error, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::io::{BufRead, Seek, Write};
use std::path::Path;

/// In-memory store of loose records, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    validator: RecordValidator,
}

impl RecordStore {
    /// Creates an empty store with the default validation rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the validator used by [`add`](Self::add).
    #[must_use]
    pub fn with_validator(mut self, validator: RecordValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Returns the validator.
    #[must_use]
    pub const fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    /// Returns every record in store order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Validates and appends a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if the record breaks a field rule
    /// and [`Error::DuplicateId`] if its id is already stored. The store is
    /// unchanged in both cases.
    pub fn add(&mut self, record: Record) -> Result<()> {
        let validation = self.validator.validate(&record);
        if !validation.is_valid {
            let reason = validation.reason();
            tracing::warn!(%reason, "record rejected");
            return Err(Error::ValidationFailed { reason });
        }

        if let Some(id) = record.text("id")
            && self
                .records
                .iter()
                .any(|r| r.text("id").as_deref() == Some(id.as_str()))
        {
            tracing::warn!(%id, "record rejected: duplicate id");
            return Err(Error::DuplicateId(id));
        }

        self.records.push(record);
        Ok(())
    }

    /// Finds records whose `name` contains `query`, ignoring case.
    ///
    /// Records without a text `name` never match.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Record> {
        let query = query.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.name().is_some_and(|n| n.to_lowercase().contains(&query)))
            .collect()
    }

    /// Sorts the records in place by one field.
    ///
    /// The sort is stable. Numbers order by value, text lexicographically,
    /// booleans `false` first and nulls compare equal. Sorting an empty store
    /// does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SortKey`] if the first record lacks `key`, and
    /// [`Error::IncomparableValues`] if a later record lacks it or holds a
    /// value of another kind. The order is unchanged on error.
    pub fn sort(&mut self, key: &str, descending: bool) -> Result<()> {
        let Some(first) = self.records.first() else {
            tracing::warn!(key, "sort requested on an empty store");
            return Ok(());
        };
        let reference = first.get(key).ok_or_else(|| Error::SortKey {
            key: key.to_string(),
        })?;

        for (row, record) in self.records.iter().enumerate() {
            let value = record.get(key).ok_or_else(|| Error::IncomparableValues {
                key: key.to_string(),
                reason: format!("record {row} has no '{key}' field"),
            })?;
            if compare_values(reference, value).is_none() {
                return Err(incomparable(key, row, reference, value));
            }
        }

        self.records.sort_by(|a, b| {
            let ordering = match (a.get(key), b.get(key)) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        tracing::debug!(key, descending, count = self.records.len(), "sorted records");
        Ok(())
    }

    /// Re-validates every stored record.
    ///
    /// Returns the indexes of the records that fail, in store order.
    #[must_use]
    pub fn validate_all(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| !self.validator.is_valid(r))
            .map(|(i, _)| i)
            .collect()
    }

    /// Appends every record from a file. Imported records are not validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is unsupported or the file cannot be
    /// read. Nothing is appended on error.
    pub fn import_file(&mut self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let result = ImportService::new().import_from_file(path, options)?;
        self.records.extend_from_slice(&result.records);
        Ok(result)
    }

    /// Appends every record from a reader. Imported records are not validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents cannot be decoded. Nothing is
    /// appended on error.
    pub fn import_reader<R: BufRead + Seek>(
        &mut self,
        reader: R,
        format: Format,
    ) -> Result<ImportResult> {
        let result = ImportService::new().import_from_reader(reader, format)?;
        self.records.extend_from_slice(&result.records);
        Ok(result)
    }

    /// Writes every record to a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToExport`] for an empty store, or an error if
    /// a record lacks a header column or the file cannot be written.
    pub fn export_file(&self, path: &Path, options: &ExportOptions) -> Result<ExportResult> {
        ExportService::new().export_to_file(&self.records, path, options)
    }

    /// Writes every record to a writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToExport`] for an empty store, or an error if
    /// encoding fails.
    pub fn export_writer<W: Write>(&self, writer: W, format: Format) -> Result<ExportResult> {
        ExportService::new().export_to_writer(&self.records, writer, format)
    }
}

impl From<Vec<Record>> for RecordStore {
    fn from(records: Vec<Record>) -> Self {
        Self {
            records,
            validator: RecordValidator::default(),
        }
    }
}

fn incomparable(key: &str, row: usize, reference: &Value, value: &Value) -> Error {
    let reason = if kind_name(reference) == kind_name(value) {
        format!("record {row} holds a {} value, which has no order", kind_name(value))
    } else {
        format!(
            "record {row} holds {} but record 0 holds {}",
            kind_name(value),
            kind_name(reference)
        )
    };
    Error::IncomparableValues {
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn record(id: &str, name: &str, age: i64) -> Record {
        Record::new()
            .with("id", id)
            .with("name", name)
            .with("age", age)
    }

    fn store() -> RecordStore {
        let mut store = RecordStore::new();
        store.add(record("00000001", "Anna", 22)).unwrap();
        store.add(record("00000002", "Bob", 19)).unwrap();
        store.add(record("00000003", "Hannah", 30)).unwrap();
        store
    }

    fn names(store: &RecordStore) -> Vec<&str> {
        store.records().iter().filter_map(Record::name).collect()
    }

    #[test]
    fn test_add_rejects_invalid_record() {
        let mut store = RecordStore::new();
        let err = store.add(record("123", "Anna", 22)).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = store();
        let err = store.add(record("00000002", "Other", 40)).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "00000002"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let store = store();
        let found: Vec<_> = store.search("AN").into_iter().filter_map(Record::name).collect();
        assert_eq!(found, vec!["Anna", "Hannah"]);
        assert!(store.search("zed").is_empty());
    }

    #[test]
    fn test_search_skips_records_without_text_name() {
        let store = RecordStore::from(vec![
            Record::new().with("name", 42),
            Record::new().with("id", "00000001"),
            Record::new().with("name", "Dana"),
        ]);
        assert_eq!(store.search("").len(), 1);
    }

    #[test]
    fn test_sort_by_number() {
        let mut store = store();
        store.sort("age", false).unwrap();
        assert_eq!(names(&store), vec!["Bob", "Anna", "Hannah"]);

        store.sort("age", true).unwrap();
        assert_eq!(names(&store), vec!["Hannah", "Anna", "Bob"]);
    }

    #[test]
    fn test_sort_by_text() {
        let mut store = store();
        store.sort("name", true).unwrap();
        assert_eq!(names(&store), vec!["Hannah", "Bob", "Anna"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut store = RecordStore::from(vec![
            Record::new().with("name", "A").with("grade", 2),
            Record::new().with("name", "B").with("grade", 1),
            Record::new().with("name", "C").with("grade", 2),
            Record::new().with("name", "D").with("grade", 1),
        ]);
        store.sort("grade", false).unwrap();
        assert_eq!(names(&store), vec!["B", "D", "A", "C"]);

        store.sort("grade", true).unwrap();
        assert_eq!(names(&store), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_sort_empty_store_is_noop() {
        let mut store = RecordStore::new();
        store.sort("anything", false).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_sort_unknown_key() {
        let mut store = store();
        let err = store.sort("gpa", false).unwrap_err();
        assert!(matches!(err, Error::SortKey { key } if key == "gpa"));
        assert_eq!(names(&store), vec!["Anna", "Bob", "Hannah"]);
    }

    #[test]
    fn test_sort_mixed_kinds_leaves_order() {
        let mut store = RecordStore::from(vec![
            Record::new().with("name", "A").with("age", 30),
            Record::new().with("name", "B").with("age", "20"),
        ]);
        let err = store.sort("age", false).unwrap_err();
        assert!(matches!(err, Error::IncomparableValues { .. }));
        assert_eq!(names(&store), vec!["A", "B"]);
    }

    #[test]
    fn test_sort_later_record_missing_key() {
        let mut store = RecordStore::from(vec![
            Record::new().with("name", "B").with("age", 30),
            Record::new().with("name", "A"),
        ]);
        let err = store.sort("age", false).unwrap_err();
        assert!(err.to_string().contains("record 1 has no 'age' field"));
    }

    #[test]
    fn test_sort_mixed_integer_and_real() {
        let mut store = RecordStore::from(vec![
            Record::new().with("name", "A").with("gpa", 3.5),
            Record::new().with("name", "B").with("gpa", 3),
        ]);
        store.sort("gpa", false).unwrap();
        assert_eq!(names(&store), vec!["B", "A"]);
    }

    #[test]
    fn test_validate_all_reports_indexes() {
        let mut store = RecordStore::new();
        store
            .import_reader(
                Cursor::new("id,name,age\n00000001,Anna,22\n123,Bob,19\n00000003,X,30\n"),
                Format::Csv,
            )
            .unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.validate_all(), vec![1, 2]);
    }

    #[test]
    fn test_import_appends() {
        let mut store = store();
        let result = store
            .import_reader(Cursor::new(r#"[{"name": "Zoe", "age": 18}]"#), Format::Json)
            .unwrap();
        assert_eq!(result.imported(), 1);
        assert_eq!(store.len(), 4);
        assert_eq!(store.records()[3].get("age"), Some(&json!(18)));
    }

    #[test]
    fn test_failed_import_appends_nothing() {
        let mut store = store();
        let result = store.import_reader(Cursor::new(r#"{"name": 1"#), Format::Json);
        assert!(result.is_err());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_export_empty_store() {
        let store = RecordStore::new();
        let err = store.export_writer(Vec::new(), Format::Json).unwrap_err();
        assert!(matches!(err, Error::NothingToExport));
    }

    #[test]
    fn test_export_csv() {
        let store = store();
        let mut output = Vec::new();
        let result = store.export_writer(&mut output, Format::Csv).unwrap();
        assert_eq!(result.exported, 3);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,name,age\n00000001,Anna,22\n00000002,Bob,19\n00000003,Hannah,30\n"
        );
    }

    #[test]
    fn test_clear() {
        let mut store = store();
        store.clear();
        assert!(store.is_empty());
    }
}
