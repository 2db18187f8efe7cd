//! Persisted student store.
//!
//! Typed CRUD over [`Student`] records with GPA statistics. Every mutation is
//! written through the [`PersistenceBackend`] before it returns, and the
//! in-memory set only changes once the save succeeds.

use crate::io::{
    ExportOptions, ExportResult, ExportService, Format, ImportOptions, ImportResult,
    ImportService, RecordValidator,
};
use crate::models::{Record, Student, StudentDraft, StudentId, StudentUpdate};
use crate::storage::PersistenceBackend;
use crate::{Error, Result};
use std::io::{BufRead, Seek, Write};
use std::path::Path;

/// Store of typed students backed by a persistence backend.
pub struct StudentStore<B: PersistenceBackend> {
    backend: B,
    students: Vec<Student>,
    /// Present when adds must pass the name and age rules.
    validator: Option<RecordValidator>,
}

impl<B: PersistenceBackend> StudentStore<B> {
    /// Opens a store over `backend`, loading its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn new(backend: B) -> Result<Self> {
        let students = backend.load()?;
        tracing::debug!(count = students.len(), "opened student store");
        Ok(Self {
            backend,
            students,
            validator: None,
        })
    }

    /// Enables or disables validation of added students.
    #[must_use]
    pub fn with_strict_add(mut self, strict: bool) -> Self {
        self.validator = strict.then(RecordValidator::new);
        self
    }

    /// Returns the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Adds a student under the next free id and persists the store.
    ///
    /// The id is one more than the largest stored id, or 1 for an empty
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-finite GPA or when the id
    /// space is exhausted, [`Error::ValidationFailed`] when strict adds are
    /// enabled and the draft breaks a rule, or an error if persisting fails.
    pub fn add(&mut self, draft: StudentDraft) -> Result<Student> {
        self.check_draft(&draft)?;

        let student = draft.into_student(self.next_id()?);
        let mut students = self.students.clone();
        students.push(student.clone());
        self.commit(students)?;

        tracing::info!(id = %student.id, "added student");
        Ok(student)
    }

    /// Finds a student by id.
    #[must_use]
    pub fn find(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Removes a student by id.
    ///
    /// Returns `false` and leaves the store untouched when no student has
    /// that id.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn remove(&mut self, id: StudentId) -> Result<bool> {
        let Some(index) = self.students.iter().position(|s| s.id == id) else {
            return Ok(false);
        };
        let mut students = self.students.clone();
        students.remove(index);
        self.commit(students)?;

        tracing::info!(%id, "removed student");
        Ok(true)
    }

    /// Applies an update to a student and persists the store.
    ///
    /// Returns the updated student, or `None` when no student has that id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-finite GPA, or an error if
    /// persisting fails.
    pub fn update(&mut self, id: StudentId, update: &StudentUpdate) -> Result<Option<Student>> {
        update.check()?;
        let Some(index) = self.students.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        let mut students = self.students.clone();
        update.apply(&mut students[index]);
        let updated = students[index].clone();
        self.commit(students)?;

        tracing::info!(%id, fields = ?update.fields(), "updated student");
        Ok(Some(updated))
    }

    /// Returns every student in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Student] {
        &self.students
    }

    /// Number of stored students.
    #[must_use]
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Returns whether the store holds no students.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Returns the student with the highest GPA.
    ///
    /// Ties go to the earliest student in store order.
    #[must_use]
    pub fn highest_gpa(&self) -> Option<&Student> {
        self.students.iter().fold(None, |best, s| match best {
            Some(b) if b.gpa >= s.gpa => Some(b),
            _ => Some(s),
        })
    }

    /// Mean GPA over every student, or 0.0 for an empty store.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_gpa(&self) -> f64 {
        if self.students.is_empty() {
            return 0.0;
        }
        self.students.iter().map(|s| s.gpa).sum::<f64>() / self.students.len() as f64
    }

    /// Students whose major equals `major`, ignoring case.
    #[must_use]
    pub fn filter_by_major(&self, major: &str) -> Vec<&Student> {
        let major = major.to_lowercase();
        self.students
            .iter()
            .filter(|s| s.major.to_lowercase() == major)
            .collect()
    }

    /// Replaces the in-memory set with the backend contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn reload(&mut self) -> Result<()> {
        self.students = self.backend.load()?;
        tracing::debug!(count = self.students.len(), "reloaded student store");
        Ok(())
    }

    /// Every student as a loose record.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.students.iter().map(Record::from).collect()
    }

    /// Writes every student to a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToExport`] for an empty store, or an error if
    /// the format is unsupported or the file cannot be written.
    pub fn export_file(&self, path: &Path, options: &ExportOptions) -> Result<ExportResult> {
        ExportService::new().export_to_file(&self.records(), path, options)
    }

    /// Writes every student to a writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToExport`] for an empty store, or an error if
    /// encoding fails.
    pub fn export_writer<W: Write>(&self, writer: W, format: Format) -> Result<ExportResult> {
        ExportService::new().export_to_writer(&self.records(), writer, format)
    }

    /// Adds every student read from a file.
    ///
    /// See [`import_reader`](Self::import_reader) for how rows are converted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a row cannot be
    /// converted. Nothing is added on error.
    pub fn import_file(&mut self, path: &Path, options: &ImportOptions) -> Result<ImportResult> {
        let result = ImportService::new().import_from_file(path, options)?;
        self.append_imported(result)
    }

    /// Adds every student read from a reader.
    ///
    /// Rows are re-typed into drafts (numeric text is accepted for `age` and
    /// `gpa`) and given fresh ids; any `id` column is ignored. The returned
    /// result holds the stored students as records.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents cannot be decoded or a row cannot be
    /// converted. Nothing is added on error.
    pub fn import_reader<R: BufRead + Seek>(
        &mut self,
        reader: R,
        format: Format,
    ) -> Result<ImportResult> {
        let result = ImportService::new().import_from_reader(reader, format)?;
        self.append_imported(result)
    }

    fn append_imported(&mut self, result: ImportResult) -> Result<ImportResult> {
        let drafts = result
            .records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let draft = StudentDraft::try_from(record).map_err(|e| match e {
                    Error::InvalidInput(msg) => Error::InvalidInput(format!("record {row}: {msg}")),
                    other => other,
                })?;
                self.check_draft(&draft)?;
                Ok(draft)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut students = self.students.clone();
        let mut stored = Vec::with_capacity(drafts.len());
        let mut next = self.next_id();
        for draft in drafts {
            let student = draft.into_student(next?);
            next = student.id.next().ok_or_else(id_exhausted);
            stored.push(Record::from(&student));
            students.push(student);
        }
        if !stored.is_empty() {
            self.commit(students)?;
        }

        tracing::info!(count = stored.len(), format = %result.format, "imported students");
        Ok(ImportResult {
            records: stored,
            ..result
        })
    }

    fn check_draft(&self, draft: &StudentDraft) -> Result<()> {
        draft.check()?;
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        let validation = validator.validate_draft(draft);
        if validation.is_valid {
            Ok(())
        } else {
            let reason = validation.reason();
            tracing::warn!(%reason, "student rejected");
            Err(Error::ValidationFailed { reason })
        }
    }

    fn next_id(&self) -> Result<StudentId> {
        match self.students.iter().map(|s| s.id).max() {
            Some(max) => max.next().ok_or_else(id_exhausted),
            None => Ok(StudentId::FIRST),
        }
    }

    /// Saves `students` and adopts them once the backend accepts them.
    fn commit(&mut self, students: Vec<Student>) -> Result<()> {
        self.backend.save(&students)?;
        self.students = students;
        Ok(())
    }
}

fn id_exhausted() -> Error {
    Error::InvalidInput("no student id left after the largest stored id".to_string())
}
