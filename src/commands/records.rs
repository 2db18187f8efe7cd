//! Loose record command handlers.

use super::RecordsAction;
use anyhow::bail;
use roster::io::{ExportOptions, ImportOptions};
use roster::{Format, Record, RecordStore};
use std::path::Path;

/// Records command.
pub fn cmd_records(action: RecordsAction) -> anyhow::Result<()> {
    match action {
        RecordsAction::Validate { file, format } => validate(&file, format),
        RecordsAction::Search {
            file,
            query,
            format,
        } => search(&file, &query, format),
        RecordsAction::Sort {
            file,
            key,
            desc,
            output,
            format,
        } => sort(&file, &key, desc, output.as_deref(), format),
        RecordsAction::Convert {
            input,
            output,
            from,
            to,
        } => convert(&input, &output, from, to),
    }
}

fn load(file: &Path, format: Option<Format>) -> anyhow::Result<RecordStore> {
    let mut store = RecordStore::new();
    store.import_file(file, &ImportOptions { format })?;
    Ok(store)
}

fn print_record(record: &Record) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

fn validate(file: &Path, format: Option<Format>) -> anyhow::Result<()> {
    let store = load(file, format)?;
    let invalid = store.validate_all();

    for &index in &invalid {
        let result = store.validator().validate(&store.records()[index]);
        println!("record {index}: {}", result.reason());
    }
    println!(
        "{} of {} records valid",
        store.len() - invalid.len(),
        store.len()
    );

    if !invalid.is_empty() {
        bail!("{} invalid records in {}", invalid.len(), file.display());
    }
    Ok(())
}

fn search(file: &Path, query: &str, format: Option<Format>) -> anyhow::Result<()> {
    let store = load(file, format)?;
    for record in store.search(query) {
        print_record(record)?;
    }
    Ok(())
}

fn sort(
    file: &Path,
    key: &str,
    descending: bool,
    output: Option<&Path>,
    format: Option<Format>,
) -> anyhow::Result<()> {
    let mut store = load(file, format)?;
    store.sort(key, descending)?;

    match output {
        Some(path) => {
            let result = store.export_file(path, &ExportOptions::default())?;
            println!("Wrote {} records to {}", result.exported, path.display());
        },
        None => {
            for record in store.records() {
                print_record(record)?;
            }
        },
    }
    Ok(())
}

fn convert(
    input: &Path,
    output: &Path,
    from: Option<Format>,
    to: Option<Format>,
) -> anyhow::Result<()> {
    let store = load(input, from)?;
    let result = store.export_file(output, &ExportOptions { format: to })?;
    println!(
        "Converted {} records from {} to {} ({})",
        result.exported,
        input.display(),
        output.display(),
        result.format
    );
    Ok(())
}
