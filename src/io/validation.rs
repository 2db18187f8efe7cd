//! Record validation.
//!
//! Checks loose records against the field-format rules before they are
//! accepted into a store. Validation is a pure predicate: it never changes
//! the record.
//!
//! # Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | `name` | letters and spaces only, 2 to 50 characters |
//! | `id` | exactly 8 digits |
//! | `age` | integer between 15 and 100 inclusive |
//!
//! A missing field is checked as its failing default (empty text, age 0), so
//! absence is reported as an ordinary validation issue.

use crate::models::{Record, StudentDraft, integer_of};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Names: letters and spaces, 2 to 50 characters.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]{2,50}$").unwrap_or_else(|_| unreachable!()));

/// Loose ids: exactly eight ASCII digits.
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").unwrap_or_else(|_| unreachable!()));

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Warning: issue noted but the record is accepted.
    Warning,
    /// Error: the record must be rejected.
    Error,
}

/// A validation issue found on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The field that has an issue.
    pub field: String,
    /// Description of the issue.
    pub message: String,
    /// Severity of the issue.
    pub severity: ValidationSeverity,
}

impl ValidationIssue {
    /// Creates a warning issue.
    #[must_use]
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }

    /// Creates an error issue.
    #[must_use]
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of validating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the record is acceptable.
    pub is_valid: bool,
    /// Issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let is_valid = !issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error);
        Self { is_valid, issues }
    }

    /// Joins the error issues into one line.
    #[must_use]
    pub fn reason(&self) -> String {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validates records against the field-format rules.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    min_age: i64,
    max_age: i64,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self {
            min_age: 15,
            max_age: 100,
        }
    }
}

impl RecordValidator {
    /// Creates a new validator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive age range.
    #[must_use]
    pub const fn with_age_range(mut self, min_age: i64, max_age: i64) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    /// Returns whether a record passes every rule.
    #[must_use]
    pub fn is_valid(&self, record: &Record) -> bool {
        self.validate(record).is_valid
    }

    /// Validates a loose record, collecting every issue.
    #[must_use]
    pub fn validate(&self, record: &Record) -> ValidationResult {
        let mut issues = Vec::new();

        self.check_name(record.get("name"), &mut issues);

        let id = match record.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => {
                issues.push(ValidationIssue::warning(
                    "id",
                    "id stored as a number, checked as text",
                ));
                n.to_string()
            },
            _ => String::new(),
        };
        if !ID_PATTERN.is_match(&id) {
            issues.push(ValidationIssue::error(
                "id",
                format!("'{id}' is not exactly 8 digits"),
            ));
        }

        let age = record.get("age").and_then(integer_of).unwrap_or(0);
        self.check_age(age, &mut issues);

        ValidationResult::from_issues(issues)
    }

    /// Validates the name and age of a typed draft.
    ///
    /// Typed ids are store-assigned, so the id rule does not apply.
    #[must_use]
    pub fn validate_draft(&self, draft: &StudentDraft) -> ValidationResult {
        let mut issues = Vec::new();
        let name = Value::String(draft.name.clone());
        self.check_name(Some(&name), &mut issues);
        self.check_age(i64::from(draft.age), &mut issues);
        ValidationResult::from_issues(issues)
    }

    #[allow(clippy::unused_self)]
    fn check_name(&self, name: Option<&Value>, issues: &mut Vec<ValidationIssue>) {
        let name = name.and_then(Value::as_str).unwrap_or_default();
        if !NAME_PATTERN.is_match(name) {
            issues.push(ValidationIssue::error(
                "name",
                format!("'{name}' must be 2-50 letters or spaces"),
            ));
        }
    }

    fn check_age(&self, age: i64, issues: &mut Vec<ValidationIssue>) {
        if !(self.min_age..=self.max_age).contains(&age) {
            issues.push(ValidationIssue::error(
                "age",
                format!(
                    "{age} is outside {}..={}",
                    self.min_age, self.max_age
                ),
            ));
        }
    }
}
