//! In-memory persistence backend.

use crate::Result;
use crate::models::Student;
use crate::storage::traits::PersistenceBackend;

/// Keeps students in process memory.
///
/// Nothing survives the process. Counts saves so callers can check which
/// operations persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    students: Vec<Student>,
    saves: usize,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `students`.
    #[must_use]
    pub const fn with_students(students: Vec<Student>) -> Self {
        Self { students, saves: 0 }
    }

    /// Number of completed saves.
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl PersistenceBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<Student>> {
        Ok(self.students.clone())
    }

    fn save(&mut self, students: &[Student]) -> Result<()> {
        self.students = students.to_vec();
        self.saves += 1;
        Ok(())
    }
}
