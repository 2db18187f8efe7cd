//! Typed student records and identifiers.

use super::record::{Record, integer_of, real_of};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Store-assigned student identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(u64);

impl StudentId {
    /// The id given to the first student of an empty store.
    pub const FIRST: Self = Self(1);

    /// Creates a student id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the id following this one, or `None` past `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StudentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A persisted student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier, assigned by the store.
    pub id: StudentId,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Grade point average.
    pub gpa: f64,
    /// Field of study.
    pub major: String,
    /// Contact email address.
    pub email: String,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} (age {}, gpa {:.2}, {}, {})",
            self.id, self.name, self.age, self.gpa, self.major, self.email
        )
    }
}

impl From<&Student> for Record {
    fn from(s: &Student) -> Self {
        Self::new()
            .with("id", s.id.get())
            .with("name", s.name.as_str())
            .with("age", s.age)
            .with("gpa", s.gpa)
            .with("major", s.major.as_str())
            .with("email", s.email.as_str())
    }
}

/// The fields a caller supplies when adding a student.
///
/// The id is never part of a draft: the store assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDraft {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Grade point average.
    pub gpa: f64,
    /// Field of study.
    pub major: String,
    /// Contact email address.
    pub email: String,
}

impl StudentDraft {
    /// Checks that every field can be persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a NaN or infinite GPA.
    pub fn check(&self) -> Result<()> {
        finite_gpa(self.gpa).map(|_| ())
    }

    /// Attaches an id, producing a student.
    #[must_use]
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            age: self.age,
            gpa: self.gpa,
            major: self.major,
            email: self.email,
        }
    }
}

impl TryFrom<&Record> for StudentDraft {
    type Error = Error;

    /// Re-types an imported record. Numeric fields accept numbers or numeric
    /// text, so rows read from CSV convert as well as JSON or XLSX rows. Any
    /// `id` field is ignored.
    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            name: text_field(record, StudentField::Name)?,
            age: age_of(required(record, StudentField::Age)?)?,
            gpa: gpa_of(required(record, StudentField::Gpa)?)?,
            major: text_field(record, StudentField::Major)?,
            email: text_field(record, StudentField::Email)?,
        })
    }
}

/// The closed set of fields an update may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    /// Full name.
    Name,
    /// Age in years.
    Age,
    /// Grade point average.
    Gpa,
    /// Field of study.
    Major,
    /// Contact email address.
    Email,
}

impl StudentField {
    /// Returns all updatable fields.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Name, Self::Age, Self::Gpa, Self::Major, Self::Email]
    }

    /// Returns the field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Gpa => "gpa",
            Self::Major => "major",
            Self::Email => "email",
        }
    }

    /// Parses a field name, case-insensitively.
    ///
    /// Returns `None` for `id` and any other name outside the set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            "gpa" => Some(Self::Gpa),
            "major" => Some(Self::Major),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial update of a student.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentUpdate {
    /// New name.
    pub name: Option<String>,
    /// New age.
    pub age: Option<u32>,
    /// New GPA.
    pub gpa: Option<f64>,
    /// New major.
    pub major: Option<String>,
    /// New email.
    pub email: Option<String>,
}

impl StudentUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the age.
    #[must_use]
    pub const fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the GPA.
    #[must_use]
    pub const fn with_gpa(mut self, gpa: f64) -> Self {
        self.gpa = Some(gpa);
        self
    }

    /// Sets the major.
    #[must_use]
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = Some(major.into());
        self
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builds an update from `(field, value)` text pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for a field name outside
    /// [`StudentField::all`] and [`Error::InvalidInput`] for a value that
    /// does not parse as the field's type.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut update = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            let field =
                StudentField::parse(key).ok_or_else(|| Error::UnknownField(key.to_string()))?;
            match field {
                StudentField::Name => update.name = Some(value.to_string()),
                StudentField::Age => update.age = Some(age_of(&Value::from(value))?),
                StudentField::Gpa => update.gpa = Some(gpa_of(&Value::from(value))?),
                StudentField::Major => update.major = Some(value.to_string()),
                StudentField::Email => update.email = Some(value.to_string()),
            }
        }
        Ok(update)
    }

    /// Returns whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// The fields this update sets.
    #[must_use]
    pub fn fields(&self) -> Vec<StudentField> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push(StudentField::Name);
        }
        if self.age.is_some() {
            fields.push(StudentField::Age);
        }
        if self.gpa.is_some() {
            fields.push(StudentField::Gpa);
        }
        if self.major.is_some() {
            fields.push(StudentField::Major);
        }
        if self.email.is_some() {
            fields.push(StudentField::Email);
        }
        fields
    }

    /// Checks that every set field can be persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a NaN or infinite GPA.
    pub fn check(&self) -> Result<()> {
        self.gpa.map_or(Ok(()), |gpa| finite_gpa(gpa).map(|_| ()))
    }

    /// Merges the set fields into a student. The id is never touched.
    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name.clone_from(name);
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(gpa) = self.gpa {
            student.gpa = gpa;
        }
        if let Some(major) = &self.major {
            student.major.clone_from(major);
        }
        if let Some(email) = &self.email {
            student.email.clone_from(email);
        }
    }
}

fn required(record: &Record, field: StudentField) -> Result<&Value> {
    record
        .get(field.as_str())
        .ok_or_else(|| Error::InvalidInput(format!("missing field '{field}'")))
}

fn text_field(record: &Record, field: StudentField) -> Result<String> {
    match required(record, field)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        // Spreadsheets store empty text as a blank cell.
        Value::Null => Ok(String::new()),
        other => Err(Error::InvalidInput(format!(
            "field '{field}': expected text, found {other}"
        ))),
    }
}

fn age_of(value: &Value) -> Result<u32> {
    integer_of(value)
        .and_then(|age| u32::try_from(age).ok())
        .ok_or_else(|| Error::InvalidInput(format!("field 'age': {value} is not a valid age")))
}

fn gpa_of(value: &Value) -> Result<f64> {
    real_of(value)
        .ok_or_else(|| Error::InvalidInput(format!("field 'gpa': {value} is not a number")))
        .and_then(finite_gpa)
}

/// Rejects GPAs that JSON cannot represent.
pub(crate) fn finite_gpa(gpa: f64) -> Result<f64> {
    if gpa.is_finite() {
        Ok(gpa)
    } else {
        Err(Error::InvalidInput(format!(
            "field 'gpa': {gpa} is not a finite number"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Student {
        Student {
            id: StudentId::new(7),
            name: "Ada Lovelace".to_string(),
            age: 20,
            gpa: 3.9,
            major: "Mathematics".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_student_id_next() {
        assert_eq!(StudentId::FIRST.next(), Some(StudentId::new(2)));
        assert_eq!(StudentId::new(41).next().map(StudentId::get), Some(42));
        assert_eq!(StudentId::new(u64::MAX).next(), None);
    }

    #[test]
    fn test_student_serializes_flat() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            json!({
                "id": 7,
                "name": "Ada Lovelace",
                "age": 20,
                "gpa": 3.9,
                "major": "Mathematics",
                "email": "ada@example.com"
            })
        );
    }

    #[test]
    fn test_student_to_record_field_order() {
        let record = Record::from(&sample());
        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec!["id", "name", "age", "gpa", "major", "email"]);
    }

    #[test]
    fn test_draft_from_text_record() {
        let record = Record::new()
            .with("id", "99")
            .with("name", "Ben")
            .with("age", "21")
            .with("gpa", "3.25")
            .with("major", "Physics")
            .with("email", "ben@example.com");

        let draft = StudentDraft::try_from(&record).unwrap();
        assert_eq!(draft.name, "Ben");
        assert_eq!(draft.age, 21);
        assert!((draft.gpa - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_draft_missing_field() {
        let record = Record::new().with("name", "Ben").with("age", 21);
        let err = StudentDraft::try_from(&record).unwrap_err();
        assert!(err.to_string().contains("gpa"));
    }

    #[test]
    fn test_draft_negative_age_rejected() {
        let record = Record::from(&sample()).with("age", -3);
        assert!(StudentDraft::try_from(&record).is_err());
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(StudentField::parse("GPA"), Some(StudentField::Gpa));
        assert_eq!(StudentField::parse(" email "), Some(StudentField::Email));
        assert_eq!(StudentField::parse("id"), None);
        assert_eq!(StudentField::parse("height"), None);
    }

    #[test]
    fn test_update_changes_only_set_fields() {
        let mut student = sample();
        let update = StudentUpdate::new().with_gpa(4.0);
        update.apply(&mut student);

        let mut expected = sample();
        expected.gpa = 4.0;
        assert_eq!(student, expected);
    }

    #[test]
    fn test_update_from_pairs() {
        let update = StudentUpdate::from_pairs([("age", "22"), ("major", "History")]).unwrap();
        assert_eq!(update.age, Some(22));
        assert_eq!(update.major.as_deref(), Some("History"));
        assert_eq!(update.fields(), vec![StudentField::Age, StudentField::Major]);
    }

    #[test]
    fn test_update_from_pairs_rejects_unknown_field() {
        let err = StudentUpdate::from_pairs([("nickname", "Addie")]).unwrap_err();
        assert!(matches!(err, Error::UnknownField(ref f) if f == "nickname"));

        let err = StudentUpdate::from_pairs([("id", "5")]).unwrap_err();
        assert!(matches!(err, Error::UnknownField(_)));
    }

    #[test]
    fn test_update_from_pairs_rejects_bad_number() {
        let err = StudentUpdate::from_pairs([("gpa", "high")]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_gpa_rejected() {
        let draft = StudentDraft {
            gpa: f64::NAN,
            ..StudentDraft::try_from(&Record::from(&sample())).unwrap()
        };
        assert!(matches!(draft.check(), Err(Error::InvalidInput(_))));

        assert!(StudentUpdate::new().with_gpa(f64::INFINITY).check().is_err());
        assert!(StudentUpdate::new().with_gpa(3.0).check().is_ok());
        assert!(StudentUpdate::new().with_name("X").check().is_ok());

        let record = Record::from(&sample()).with("gpa", "inf");
        assert!(StudentDraft::try_from(&record).is_err());
    }

    #[test]
    fn test_draft_blank_text_is_empty() {
        let record = Record::from(&sample()).with("email", Value::Null);
        let draft = StudentDraft::try_from(&record).unwrap();
        assert_eq!(draft.email, "");
    }

    #[test]
    fn test_empty_update() {
        assert!(StudentUpdate::new().is_empty());
        assert!(!StudentUpdate::new().with_name("X").is_empty());
    }
}
