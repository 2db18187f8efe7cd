//! Loose record mapping.
//!
//! A [`Record`] is an ordered mapping from field name to value. Field order is
//! the order of first insertion and drives the column order of tabular
//! exports.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::fmt;

/// An ordered field-name to value mapping.
///
/// Values keep the type the source format carried (text, number, boolean,
/// null or nested JSON).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a field, returning the previous value.
    ///
    /// A new field is appended after the existing ones; replacing a field keeps
    /// its position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Sets a field and returns the record.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns whether the record carries a field.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Field name and value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `name` field when it holds text.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Renders a scalar field as text.
    ///
    /// Text is returned as-is and numbers and booleans by their display form.
    /// Missing, null and nested values yield `None`.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Converts a field in place to the given kind.
    ///
    /// Absent fields are left absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the value cannot be represented as
    /// `kind`; the record is unchanged in that case.
    pub fn retype(&mut self, field: &str, kind: FieldKind) -> Result<()> {
        let Some(value) = self.0.get_mut(field) else {
            return Ok(());
        };
        let converted = kind.coerce(value).ok_or_else(|| {
            Error::InvalidInput(format!(
                "field '{field}': cannot convert {value} to {kind}"
            ))
        })?;
        *value = converted;
        Ok(())
    }

    /// Borrows the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidInput(format!(
                "expected a JSON object, found {}",
                kind_name(&other)
            ))),
        }
    }
}

/// Scalar kinds a field can be re-typed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// Finite floating point number.
    Real,
}

impl FieldKind {
    /// Converts a value to this kind, or `None` if it has no representation.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match self {
            Self::Text => match value {
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Number(n) => Some(Value::String(n.to_string())),
                Value::Bool(b) => Some(Value::String(b.to_string())),
                Value::Null => Some(Value::String(String::new())),
                Value::Array(_) | Value::Object(_) => None,
            },
            Self::Integer => integer_of(value).map(Value::from),
            Self::Real => real_of(value)
                .and_then(Number::from_f64)
                .map(Value::Number),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Real => write!(f, "real"),
        }
    }
}

/// Reads an integer from a number or integer text.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a finite real from a number or numeric text.
pub(crate) fn real_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Short name of a value's kind, for diagnostics.
pub(crate) const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Orders two values of the same scalar kind.
///
/// Returns `None` for values of different kinds and for nested values.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_order_is_insertion_order() {
        let record = Record::new()
            .with("name", "Anna")
            .with("id", "12345678")
            .with("age", 20);

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec!["name", "id", "age"]);
    }

    #[test]
    fn test_replacing_keeps_position() {
        let mut record = Record::new().with("a", 1).with("b", 2);
        record.insert("a", 3);

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&json!(3)));
    }

    #[test]
    fn test_text_rendering() {
        let record = Record::new()
            .with("id", 12_345_678)
            .with("name", "Ben")
            .with("active", true)
            .with("note", Value::Null);

        assert_eq!(record.text("id").as_deref(), Some("12345678"));
        assert_eq!(record.text("name").as_deref(), Some("Ben"));
        assert_eq!(record.text("active").as_deref(), Some("true"));
        assert_eq!(record.text("note"), None);
        assert_eq!(record.text("missing"), None);
    }

    #[test]
    fn test_retype_text_to_numbers() {
        let mut record = Record::new().with("age", "20").with("gpa", " 3.5 ");

        record.retype("age", FieldKind::Integer).unwrap();
        record.retype("gpa", FieldKind::Real).unwrap();

        assert_eq!(record.get("age"), Some(&json!(20)));
        assert_eq!(record.get("gpa"), Some(&json!(3.5)));
    }

    #[test]
    fn test_retype_failure_leaves_value() {
        let mut record = Record::new().with("age", "twenty");

        let err = record.retype("age", FieldKind::Integer).unwrap_err();
        assert!(err.to_string().contains("age"));
        assert_eq!(record.get("age"), Some(&json!("twenty")));
    }

    #[test]
    fn test_retype_absent_field_is_noop() {
        let mut record = Record::new().with("name", "Jo");
        record.retype("age", FieldKind::Integer).unwrap();
        assert!(!record.contains("age"));
    }

    #[test]
    fn test_integral_float_becomes_integer() {
        assert_eq!(integer_of(&json!(20.0)), Some(20));
        assert_eq!(integer_of(&json!(20.5)), None);
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Some(Ordering::Less));
        assert_eq!(
            compare_values(&json!(2.5), &json!(2)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_values(&json!("b"), &json!("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_values(&json!("2"), &json!(2)), None);
        assert_eq!(compare_values(&json!([1]), &json!([1])), None);
    }

    #[test]
    fn test_try_from_value() {
        let record = Record::try_from(json!({"name": "Jo", "age": 20})).unwrap();
        assert_eq!(record.name(), Some("Jo"));

        assert!(Record::try_from(json!([1, 2])).is_err());
    }
}
