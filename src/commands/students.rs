//! Persisted student command handlers.

use anyhow::{Context, bail};
use roster::io::{ExportOptions, ImportOptions};
use roster::storage::JsonFileBackend;
use roster::{Format, RosterConfig, StudentDraft, StudentId, StudentStore, StudentUpdate};
use std::path::Path;

/// Opens the configured student store.
fn open_store(config: &RosterConfig) -> anyhow::Result<StudentStore<JsonFileBackend>> {
    let path = &config.data_file;
    let backend = JsonFileBackend::open(path)
        .with_context(|| format!("opening data file {}", path.display()))?;
    let store = StudentStore::new(backend)
        .with_context(|| format!("loading data file {}", path.display()))?;
    Ok(store.with_strict_add(config.strict_add))
}

/// Add command.
pub fn cmd_add(
    config: &RosterConfig,
    name: String,
    age: u32,
    gpa: f64,
    major: String,
    email: String,
) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let student = store.add(StudentDraft {
        name,
        age,
        gpa,
        major,
        email,
    })?;
    println!("Added student {}", student.id);
    Ok(())
}

/// Remove command.
pub fn cmd_remove(config: &RosterConfig, id: u64) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    if store.remove(StudentId::new(id))? {
        println!("Removed student {id}");
    } else {
        println!("No student with id {id}");
    }
    Ok(())
}

/// Update command.
pub fn cmd_update(
    config: &RosterConfig,
    id: u64,
    assignments: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let update = StudentUpdate::from_pairs(assignments)?;
    if update.is_empty() {
        bail!("nothing to update");
    }

    let mut store = open_store(config)?;
    match store.update(StudentId::new(id), &update)? {
        Some(student) => println!("Updated {student}"),
        None => println!("No student with id {id}"),
    }
    Ok(())
}

/// Get command.
pub fn cmd_get(config: &RosterConfig, id: u64) -> anyhow::Result<()> {
    let store = open_store(config)?;
    match store.find(StudentId::new(id)) {
        Some(student) => println!("{student}"),
        None => println!("No student with id {id}"),
    }
    Ok(())
}

/// List command.
pub fn cmd_list(config: &RosterConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if store.is_empty() {
        println!("No students");
    }
    for student in store.list() {
        println!("{student}");
    }
    Ok(())
}

/// Top command.
pub fn cmd_top(config: &RosterConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    match store.highest_gpa() {
        Some(student) => println!("{student}"),
        None => println!("No students"),
    }
    Ok(())
}

/// Average command.
pub fn cmd_average(config: &RosterConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    println!("Average GPA: {:.2}", store.average_gpa());
    Ok(())
}

/// Major command.
pub fn cmd_major(config: &RosterConfig, major: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let students = store.filter_by_major(major);
    if students.is_empty() {
        println!("No students majoring in {major}");
    }
    for student in students {
        println!("{student}");
    }
    Ok(())
}

/// Export command.
pub fn cmd_export(config: &RosterConfig, file: &Path, format: Option<Format>) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let result = store.export_file(file, &ExportOptions { format })?;
    println!(
        "Exported {} students to {} ({})",
        result.exported,
        file.display(),
        result.format
    );
    Ok(())
}

/// Import command.
pub fn cmd_import(config: &RosterConfig, file: &Path, format: Option<Format>) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let result = store.import_file(file, &ImportOptions { format })?;
    println!(
        "Imported {} students from {} ({})",
        result.imported(),
        file.display(),
        result.format
    );
    Ok(())
}
