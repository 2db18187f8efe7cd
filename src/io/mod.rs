//! Import/Export I/O subsystem.
//!
//! Converts between in-memory [`Record`]s and external files.
//!
//! # Architecture
//!
//! - **Format adapters** implement [`ImportSource`] and [`ExportSink`]
//! - **Validation layer** checks loose records against the field rules
//! - **Services** orchestrate header derivation, format dispatch and file writes
//!
//! # Supported Formats
//!
//! | Format | Import | Export | Notes |
//! |--------|--------|--------|-------|
//! | CSV | ✓ | ✓ | Header row from the first record; cells are text |
//! | XLSX | ✓ | ✓ | First worksheet; typed cells |
//! | JSON | ✓ | ✓ | Array of objects; every field of every record |
//!
//! # Examples
//!
//! ```rust,ignore
//! use roster::io::{ExportOptions, ExportService, Format};
//!
//! let result = ExportService::new().export_to_file(
//!     store.records(),
//!     Path::new("students.xlsx"),
//!     &ExportOptions::default(),
//! )?;
//! println!("Exported {} records", result.exported);
//! ```
//!
//! [`Record`]: crate::models::Record

pub mod formats;
pub mod services;
pub mod traits;
pub mod validation;

pub use formats::Format;
pub use services::export::{ExportOptions, ExportResult, ExportService};
pub use services::import::{ImportOptions, ImportResult, ImportService};
pub use traits::{ExportSink, Header, ImportSource};
pub use validation::{RecordValidator, ValidationIssue, ValidationResult, ValidationSeverity};
