//! # Roster
//!
//! A file-backed student record manager.
//!
//! Roster keeps student records in memory, persists the typed variant as a
//! JSON document, and exchanges records with CSV, XLSX and JSON files.
//!
//! ## Features
//!
//! - Persisted CRUD over typed [`Student`] records with store-assigned ids
//! - GPA statistics (average, highest) and filtering by major
//! - Loose [`Record`] mappings that keep every field of an imported row
//! - Validation, case-insensitive name search and stable sorting
//! - Import and export across CSV, XLSX and JSON through one exchange layer
//!
//! ## Example
//!
//! ```rust,ignore
//! use roster::{StudentDraft, StudentStore};
//! use roster::storage::JsonFileBackend;
//!
//! let backend = JsonFileBackend::open("students_data.json")?;
//! let mut store = StudentStore::new(backend)?;
//! let student = store.add(StudentDraft {
//!     name: "Ada Lovelace".to_string(),
//!     age: 20,
//!     gpa: 3.9,
//!     major: "Mathematics".to_string(),
//!     email: "ada@example.com".to_string(),
//! })?;
//! assert_eq!(student.id.get(), 1);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::RosterConfig;
pub use io::Format;
pub use models::{FieldKind, Record, Student, StudentDraft, StudentField, StudentId, StudentUpdate};
pub use services::{RecordStore, StudentStore};
pub use storage::PersistenceBackend;

/// Error type for roster operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed JSON documents, unparsable field values |
/// | `OperationFailed` | File I/O, CSV/XLSX codec and persistence failures |
/// | `ValidationFailed` | A record fails the field-format rules |
/// | `UnsupportedFormat` | A format name or extension outside CSV, XLSX, JSON |
/// | `SortKey` | Sorting by a field the records do not carry |
/// | `IncomparableValues` | Sorting a field holding values of different kinds |
/// | `MissingField` | Exporting a row that lacks a header column |
/// | `UnknownField` | Updating a field outside the updatable set |
/// | `DuplicateId` | Adding a loose record whose id is already stored |
/// | `NothingToExport` | Exporting from an empty store |
///
/// Lookups that find nothing are not errors: they return `None` or `false`.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Reading or writing the data file fails
    /// - CSV or XLSX encoding/decoding fails
    /// - Logging cannot be initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A record was rejected by validation and not stored.
    #[error("validation failed: {reason}")]
    ValidationFailed {
        /// Summary of every failing rule.
        reason: String,
    },

    /// The requested exchange format is not supported.
    #[error("unsupported format '{format}' (supported: {supported})")]
    UnsupportedFormat {
        /// The format that was requested.
        format: String,
        /// Comma separated list of supported formats.
        supported: String,
    },

    /// Sort key is not a field of the stored records.
    #[error("cannot sort by '{key}': field not present in records")]
    SortKey {
        /// The requested key.
        key: String,
    },

    /// Values under a sort key cannot be ordered against each other.
    #[error("cannot sort by '{key}': {reason}")]
    IncomparableValues {
        /// The requested key.
        key: String,
        /// Why the values are not comparable.
        reason: String,
    },

    /// A record lacks a column required by the export header.
    #[error("record {row} is missing field '{field}'")]
    MissingField {
        /// Zero-based index of the record in the store.
        row: usize,
        /// The header column the record lacks.
        field: String,
    },

    /// Update referenced a field that cannot be changed.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A record with the same id is already stored.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Export needs at least one record to derive columns.
    #[error("nothing to export: store is empty")]
    NothingToExport,
}

/// Result type alias for roster operations.
pub type Result<T> = std::result::Result<T, Error>;
