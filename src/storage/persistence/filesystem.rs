//! JSON file persistence backend.
//!
//! Stores every student in one pretty-printed JSON array:
//!
//! ```json
//! [
//!   {"id": 1, "name": "Ada", "age": 20, "gpa": 3.9, "major": "Math", "email": "ada@uni.edu"}
//! ]
//! ```
//!
//! Saves go through a temporary sibling that is renamed over the data file.

use crate::models::Student;
use crate::storage::traits::PersistenceBackend;
use crate::storage::write_atomic;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Persists students as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Opens the data file at `path`.
    ///
    /// Missing parent directories are created, and a missing file is created
    /// holding an empty array.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the initial file cannot be
    /// created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        if !path.exists() {
            write_atomic(&path, b"[]\n")?;
            tracing::info!(path = %path.display(), "created data file");
        }

        Ok(Self { path })
    }

    /// Returns the data file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<Student>> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::OperationFailed {
            operation: "read_data_file".to_string(),
            cause: format!("{}: {e}", self.path.display()),
        })?;

        let students: Vec<Student> = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidInput(format!("{}: not a student array: {e}", self.path.display()))
        })?;

        tracing::debug!(path = %self.path.display(), count = students.len(), "loaded students");
        Ok(students)
    }

    fn save(&mut self, students: &[Student]) -> Result<()> {
        let mut content =
            serde_json::to_vec_pretty(students).map_err(|e| Error::OperationFailed {
                operation: "serialize_students".to_string(),
                cause: e.to_string(),
            })?;
        content.push(b'\n');

        write_atomic(&self.path, &content)?;
        tracing::debug!(path = %self.path.display(), count = students.len(), "saved students");
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
