//! Storage layer abstraction.
//!
//! Typed students are persisted through a [`PersistenceBackend`]:
//! - [`JsonFileBackend`]: a JSON array on disk, rewritten on every save
//! - [`MemoryBackend`]: an in-process vector, for tests and dry runs

pub mod persistence;
pub mod traits;

pub use persistence::{JsonFileBackend, MemoryBackend};
pub use traits::PersistenceBackend;

use crate::{Error, Result};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Writes `contents` to `path` through a temporary sibling and a rename.
///
/// Readers observe either the previous file or the complete new one. The
/// temporary file is removed if any step fails.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the temporary file cannot be written
/// or renamed into place.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = path
        .file_name()
        .map_or_else(|| "roster".into(), |n| n.to_string_lossy());
    let tmp_path = dir.join(format!(".{stem}-{}.tmp", Uuid::new_v4()));

    let written = fs::write(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::OperationFailed {
            operation: "write_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        });
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[2]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[2]");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("data.json");

        let err = write_atomic(&path, b"[]").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
        assert!(!path.exists());
    }
}
