//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `students.rs`: Persisted student commands (add, remove, update, statistics, import/export)
//! - `records.rs`: Loose record file commands (validate, search, sort, convert)
//! - `config.rs`: Configuration display command

mod config;
mod records;
mod students;

use clap::Subcommand;
use roster::Format;
use std::path::PathBuf;

pub use config::cmd_config;
pub use records::cmd_records;
pub use students::{
    cmd_add, cmd_average, cmd_export, cmd_get, cmd_import, cmd_list, cmd_major, cmd_remove,
    cmd_top, cmd_update,
};

/// Loose record subcommands.
#[derive(Subcommand)]
pub enum RecordsAction {
    /// Report records that break the field rules.
    Validate {
        /// Record file.
        file: PathBuf,

        /// Format: csv, xlsx or json (default: from extension).
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Print records whose name contains a query (case-insensitive).
    Search {
        /// Record file.
        file: PathBuf,

        /// Text to look for in the `name` field.
        query: String,

        /// Format: csv, xlsx or json (default: from extension).
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Sort records by a field.
    Sort {
        /// Record file.
        file: PathBuf,

        /// Field to sort by.
        #[arg(short, long)]
        key: String,

        /// Sort in descending order.
        #[arg(long)]
        desc: bool,

        /// Write the sorted records here instead of printing them.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format: csv, xlsx or json (default: from extension).
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Convert a record file to another format.
    Convert {
        /// Source file.
        input: PathBuf,

        /// Destination file.
        output: PathBuf,

        /// Source format (default: from extension).
        #[arg(long)]
        from: Option<Format>,

        /// Destination format (default: from extension).
        #[arg(long)]
        to: Option<Format>,
    },
}
