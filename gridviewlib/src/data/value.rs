//! Cell values and row identity.
//!
//! Column accessors turn a record into a [`Value`]; everything the table
//! does afterwards (filtering, sorting, faceting, display) works on values,
//! never on the record itself.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A typed cell value extracted from a record by a column accessor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or null field
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Free text
    Text(String),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the value, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    // Bool < number < text; null sorts after everything.
    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Null => 3,
        }
    }

    /// Compare two values of the same kind.
    ///
    /// Integers and floats are the same kind and compare numerically.
    /// Returns `None` when the kinds differ or either side is null.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => Some((*a as f64).total_cmp(b)),
            (Value::Float(a), Value::Int(b)) => Some(a.total_cmp(&(*b as f64))),
            (Value::Float(a), Value::Float(b)) => Some(a.total_cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order over all values.
    ///
    /// Same-kind values use [`Value::partial_compare`]; mixed kinds fall back
    /// to `Bool < number < Text < Null`.
    pub fn compare(&self, other: &Value) -> Ordering {
        self.partial_compare(other)
            .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank()))
    }

    /// Equality that treats `Int(10)` and `Float(10.0)` as equal.
    ///
    /// Null never equals anything, including another null.
    pub fn loose_eq(&self, other: &Value) -> bool {
        self.partial_compare(other) == Some(Ordering::Equal)
    }

    /// Equality used by filters, where one side is often text typed by a user.
    ///
    /// Same-kind values behave like [`Value::loose_eq`]. When exactly one
    /// side is text, it is read as the other side's kind, so `"001"` equals
    /// `Int(1)` and `"true"` equals `Bool(true)`; failing that, display text
    /// is compared. Null still equals nothing.
    pub fn coerced_eq(&self, other: &Value) -> bool {
        if self.loose_eq(other) {
            return true;
        }
        match (self, other) {
            (Value::Text(text), typed) | (typed, Value::Text(text))
                if !typed.is_null() && typed.as_str().is_none() =>
            {
                Value::parse_as(text, typed).is_some_and(|v| v.loose_eq(typed))
                    || typed.to_string() == *text
            }
            _ => false,
        }
    }

    /// Parse text as a value of the same kind as `kind`.
    fn parse_as(text: &str, kind: &Value) -> Option<Value> {
        let text = text.trim();
        match kind {
            Value::Bool(_) => text.parse().ok().map(Value::Bool),
            Value::Int(_) | Value::Float(_) => text
                .parse::<i64>()
                .map(Value::Int)
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(Value::Float)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v)
            .map(Value::Int)
            .unwrap_or(Value::Float(v as f64))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Stable identifier of a record, used for selection.
///
/// Tables without a row-id accessor use the record's position in the source
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Create a row id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        RowId(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(v: &str) -> Self {
        RowId(v.to_string())
    }
}

impl From<String> for RowId {
    fn from(v: String) -> Self {
        RowId(v)
    }
}

impl From<usize> for RowId {
    fn from(v: usize) -> Self {
        RowId(v.to_string())
    }
}
