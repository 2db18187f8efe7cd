//! Import/export services.
//!
//! High-level services that orchestrate format adapters.

pub mod export;
pub mod import;

pub use export::{ExportOptions, ExportResult, ExportService};
pub use import::{ImportOptions, ImportResult, ImportService};
