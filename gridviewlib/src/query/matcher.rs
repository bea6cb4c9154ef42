//! Compiled column filters.
//!
//! A [`Matcher`] is built from a column's strategy and a [`FilterValue`].
//! Compiling up front is what lets `set_filter` reject a bad glob pattern
//! before anything is stored.

use glob::Pattern;

use crate::data::{Column, FilterStrategy, Predicate, Value};
use crate::error::ConfigurationError;
use crate::query::options::FilterValue;
use crate::Result;

/// A filter ready to be tested against cell values.
#[derive(Clone)]
pub enum Matcher {
    Equals(Value),
    /// Lowercased needle
    Contains(String),
    Glob(Pattern),
    Range {
        min: Option<Value>,
        max: Option<Value>,
    },
    AnyOf(Vec<Matcher>),
    Custom(Predicate, FilterValue),
}

impl Matcher {
    /// Compile a filter value for a column.
    pub fn compile<T>(column: &Column<T>, value: &FilterValue) -> Result<Matcher> {
        let strategy = column.filter_strategy();
        if let FilterStrategy::Custom(predicate) = strategy {
            return Ok(Matcher::Custom(predicate.clone(), value.clone()));
        }

        match value {
            FilterValue::Value(v) => compile_single(column.key(), strategy, v),
            FilterValue::Range { min, max } => Ok(Matcher::Range {
                min: min.clone(),
                max: max.clone(),
            }),
            FilterValue::OneOf(values) => values
                .iter()
                .map(|v| compile_single(column.key(), strategy, v))
                .collect::<Result<Vec<_>>>()
                .map(Matcher::AnyOf),
        }
    }

    /// Test a cell value. Null cells never match.
    pub fn matches(&self, cell: &Value) -> bool {
        if cell.is_null() {
            return false;
        }

        match self {
            Matcher::Equals(expected) => cell.coerced_eq(expected),
            Matcher::Contains(needle) => contains_ignore_case(cell, needle),
            Matcher::Glob(pattern) => pattern.matches(&cell.to_string()),
            Matcher::Range { min, max } => {
                let above = min.as_ref().is_none_or(|m| {
                    cell.partial_compare(m)
                        .is_some_and(|o| o != std::cmp::Ordering::Less)
                });
                let below = max.as_ref().is_none_or(|m| {
                    cell.partial_compare(m)
                        .is_some_and(|o| o != std::cmp::Ordering::Greater)
                });
                above && below
            }
            Matcher::AnyOf(matchers) => matchers.iter().any(|m| m.matches(cell)),
            Matcher::Custom(predicate, value) => predicate(cell, value),
        }
    }
}

fn compile_single(key: &str, strategy: &FilterStrategy, value: &Value) -> Result<Matcher> {
    match strategy {
        FilterStrategy::Equals => Ok(Matcher::Equals(value.clone())),
        FilterStrategy::Contains => Ok(Matcher::Contains(value.to_string().to_lowercase())),
        FilterStrategy::Glob => {
            let pattern = value.to_string();
            Pattern::new(&pattern)
                .map(Matcher::Glob)
                .map_err(|e| ConfigurationError::InvalidPattern {
                    column: key.to_string(),
                    pattern,
                    message: e.to_string(),
                })
        }
        // Handled in `compile` before single values are considered.
        FilterStrategy::Custom(predicate) => Ok(Matcher::Custom(
            predicate.clone(),
            FilterValue::Value(value.clone()),
        )),
    }
}

/// Case-insensitive substring test on a value's display text.
///
/// `needle` must already be lowercased.
pub fn contains_ignore_case(cell: &Value, needle: &str) -> bool {
    match cell {
        Value::Null => false,
        Value::Text(s) => s.to_lowercase().contains(needle),
        other => other.to_string().to_lowercase().contains(needle),
    }
}
