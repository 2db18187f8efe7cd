//! Persistence backend trait.

use crate::Result;
use crate::models::Student;
use std::path::Path;

/// Trait for persistence layer backends.
///
/// Persistence backends are the authoritative source of truth for students.
/// The whole set is loaded once and rewritten on every mutation.
pub trait PersistenceBackend: Send {
    /// Loads every stored student, in stored order.
    fn load(&self) -> Result<Vec<Student>>;

    /// Replaces the stored set with `students`.
    fn save(&mut self, students: &[Student]) -> Result<()>;

    /// Location of the backing file, if there is one.
    fn location(&self) -> Option<&Path> {
        None
    }
}
