//! Loosely-typed store values and the ordered row record exchanged with the repository.
//!
//! Every domain field is a string at the API boundary, so the codec's main job is
//! stringifying whatever the store hands back and failing loudly when a column
//! that must carry a value does not.

use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// One cell read from, or bound to, the store.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// String form of the value; `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(n) => Some(n.to_string()),
            Scalar::Text(s) => Some(s.clone()),
            Scalar::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Scalar::Timestamp(t) => Some(t.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }

    /// Convert a JSON scalar from a request body. Arrays and objects have no column form.
    pub fn from_json(field: &str, v: &serde_json::Value) -> Result<Self, AppError> {
        use serde_json::Value;
        Ok(match v {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Text(b.to_string()),
            Value::Number(n) => Scalar::Text(n.to_string()),
            Value::String(s) => Scalar::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(AppError::Validation(format!("{} must be a scalar value", field)))
            }
        })
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(s) => f.write_str(&s),
            None => f.write_str("NULL"),
        }
    }
}

/// Columns to write, in the order they will be bound. Column names are code-controlled.
pub type Fields = Vec<(&'static str, Scalar)>;

/// A result row: column names in store-reported order, each with its value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: Scalar) {
        self.columns.push((column.into(), value));
    }

    /// Builder form of [`Record::push`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(column, value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// First cell named `column`.
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.columns.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// True when the column is absent or null.
    pub fn is_null(&self, column: &str) -> bool {
        self.get(column).map_or(true, Scalar::is_null)
    }

    /// Required column: absent or null is a decoding error.
    pub fn text(&self, column: &str) -> Result<String, AppError> {
        match self.get(column) {
            None => Err(AppError::Query(format!("column {} missing from result", column))),
            Some(v) => v
                .to_text()
                .ok_or_else(|| AppError::Query(format!("column {} is null", column))),
        }
    }

    /// Optional column stringified; null becomes the empty string. Absence is still an error.
    pub fn text_or_empty(&self, column: &str) -> Result<String, AppError> {
        self.get(column)
            .map(|v| v.to_text().unwrap_or_default())
            .ok_or_else(|| AppError::Query(format!("column {} missing from result", column)))
    }

    /// Optional column where both null and empty collapse to `None`.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>, AppError> {
        Ok(Some(self.text_or_empty(column)?).filter(|s| !s.is_empty()))
    }

    pub fn bool(&self, column: &str) -> Result<bool, AppError> {
        match self.get(column) {
            Some(Scalar::Bool(b)) => Ok(*b),
            Some(Scalar::Int(n)) => Ok(*n != 0),
            Some(Scalar::Text(s)) if s == "true" || s == "t" => Ok(true),
            Some(Scalar::Text(s)) if s == "false" || s == "f" => Ok(false),
            Some(other) => Err(AppError::Query(format!(
                "column {} is not a boolean: {:?}",
                column, other
            ))),
            None => Err(AppError::Query(format!("column {} missing from result", column))),
        }
    }
}

impl FromIterator<(String, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Record {
            columns: iter.into_iter().collect(),
        }
    }
}
