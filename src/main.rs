//! Binary entry point for roster.
//!
//! This binary provides the CLI interface for the roster record manager.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    RecordsAction, cmd_add, cmd_average, cmd_config, cmd_export, cmd_get, cmd_import, cmd_list,
    cmd_major, cmd_records, cmd_remove, cmd_top, cmd_update,
};
use roster::Format;
use roster::config::RosterConfig;
use roster::observability::{self, InitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Roster - a file-backed student record manager.
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Student data file (overrides configuration).
    #[arg(long, global = true, env = "ROSTER_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Add a student.
    Add {
        /// Full name.
        #[arg(long)]
        name: String,

        /// Age in years.
        #[arg(long)]
        age: u32,

        /// Grade point average.
        #[arg(long, value_parser = parse_gpa)]
        gpa: f64,

        /// Field of study.
        #[arg(long)]
        major: String,

        /// Contact email address.
        #[arg(long)]
        email: String,
    },

    /// Remove a student by id.
    Remove {
        /// Student id.
        id: u64,
    },

    /// Update fields of a student.
    Update {
        /// Student id.
        id: u64,

        /// Field assignment such as `gpa=3.7` (repeatable).
        #[arg(short, long = "set", value_name = "FIELD=VALUE", required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    /// Show a student by id.
    Get {
        /// Student id.
        id: u64,
    },

    /// List every student.
    List,

    /// Show the student with the highest GPA.
    Top,

    /// Show the average GPA.
    Average,

    /// List students of a major (case-insensitive).
    Major {
        /// Major to match.
        major: String,
    },

    /// Export every student to a file.
    Export {
        /// Destination file.
        file: PathBuf,

        /// Format: csv, xlsx or json (default: from extension).
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Import students from a file, assigning fresh ids.
    Import {
        /// Source file.
        file: PathBuf,

        /// Format: csv, xlsx or json (default: from extension).
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Work with loose record files.
    Records {
        /// Records action.
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Show the effective configuration.
    Config,
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(
        &config.logging,
        InitOptions {
            verbose: cli.verbose,
        },
    ) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &RosterConfig) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            name,
            age,
            gpa,
            major,
            email,
        } => cmd_add(config, name, age, gpa, major, email),

        Commands::Remove { id } => cmd_remove(config, id),

        Commands::Update { id, assignments } => cmd_update(config, id, assignments),

        Commands::Get { id } => cmd_get(config, id),

        Commands::List => cmd_list(config),

        Commands::Top => cmd_top(config),

        Commands::Average => cmd_average(config),

        Commands::Major { major } => cmd_major(config, &major),

        Commands::Export { file, format } => cmd_export(config, &file, format),

        Commands::Import { file, format } => cmd_import(config, &file, format),

        Commands::Records { action } => cmd_records(action),

        Commands::Config => cmd_config(config),
    }
}

/// Loads configuration, applying the `--data-file` override.
fn load_config(cli: &Cli) -> roster::Result<RosterConfig> {
    let config = RosterConfig::load(cli.config.as_deref())?;
    Ok(match &cli.data_file {
        Some(path) => config.with_data_file(path),
        None => config,
    })
}

/// Parses a `FIELD=VALUE` assignment.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    Ok((field.trim().to_string(), value.to_string()))
}

/// Parses a finite GPA; `NaN` and infinities cannot be persisted.
fn parse_gpa(s: &str) -> Result<f64, String> {
    let gpa: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if gpa.is_finite() {
        Ok(gpa)
    } else {
        Err(format!("'{s}' is not a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("gpa=3.7").unwrap(),
            ("gpa".to_string(), "3.7".to_string())
        );
        assert_eq!(
            parse_assignment("email=a=b@x.io").unwrap(),
            ("email".to_string(), "a=b@x.io".to_string())
        );
        assert!(parse_assignment("gpa").is_err());
    }

    #[test]
    fn test_numeric_arguments_are_checked() {
        assert!(Cli::try_parse_from(["roster", "get", "abc"]).is_err());
        assert!(Cli::try_parse_from(["roster", "get", "3"]).is_ok());
    }

    #[test]
    fn test_gpa_must_be_finite() {
        let add = |gpa: &'static str| {
            Cli::try_parse_from([
                "roster", "add", "--name", "Ada", "--age", "20", "--gpa", gpa, "--major", "Math",
                "--email", "ada@uni.edu",
            ])
        };
        assert!(add("3.5").is_ok());
        assert!(add("NaN").is_err());
        assert!(add("inf").is_err());
        assert!(add("high").is_err());
    }

    #[test]
    fn test_unsupported_format_rejected_by_parser() {
        assert!(Cli::try_parse_from(["roster", "export", "out.bin", "--format", "yaml"]).is_err());
    }
}
