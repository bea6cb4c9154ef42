//! Table state and construction options.
//!
//! This module contains the serializable state a table carries (sorting,
//! filters, selection, visibility, pagination) and the options used to
//! build a table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{RowId, Value};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (A-Z, smallest first)
    #[default]
    Ascending,
    /// Descending (Z-A, largest first)
    Descending,
}

impl SortDirection {
    /// Apply this direction to an ascending comparison result
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// One entry of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    /// Column key
    pub key: String,
    /// Sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortEntry {
    /// Ascending sort on a column
    pub fn asc(key: impl Into<String>) -> Self {
        SortEntry {
            key: key.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending sort on a column
    pub fn desc(key: impl Into<String>) -> Self {
        SortEntry {
            key: key.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Parses `key` or `key:asc` / `key:desc`.
impl FromStr for SortEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = match s.rsplit_once(':') {
            Some((key, dir)) => (key, dir.parse()?),
            None => (s, SortDirection::Ascending),
        };
        if key.is_empty() {
            return Err(format!("Missing column in sort entry: {}", s));
        }
        Ok(SortEntry {
            key: key.to_string(),
            direction,
        })
    }
}

impl fmt::Display for SortEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", self.key, dir)
    }
}

/// Value a column filter is tested against.
///
/// How a single `Value` matches depends on the column's
/// [`FilterStrategy`](crate::data::FilterStrategy). `Range` and `OneOf`
/// work on any non-custom column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Single value, interpreted by the column's strategy
    Value(Value),
    /// Matches if any of the values matches
    OneOf(Vec<Value>),
    // Must stay after `OneOf`: untagged structs also accept JSON arrays.
    /// Inclusive range; a missing bound is open
    Range {
        #[serde(default)]
        min: Option<Value>,
        #[serde(default)]
        max: Option<Value>,
    },
}

impl FilterValue {
    /// Inclusive range with optional bounds
    pub fn range(min: Option<Value>, max: Option<Value>) -> Self {
        FilterValue::Range { min, max }
    }

    /// Match any of the given values
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        FilterValue::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// A null filter value means "no filter" and clears the column filter.
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Value(Value::Null))
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        FilterValue::Value(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Value(Value::from(v))
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Value(Value::from(v))
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Value(Value::Bool(v))
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Value(Value::Int(v))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Value(Value::Float(v))
    }
}

/// Pagination state. Page indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (zero-based)
    pub page_index: usize,
    /// Rows per page (at least 1)
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Number of pages needed for `len` rows. Zero rows means zero pages.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamp a page index into `[0, max(page_count, 1) - 1]`.
pub fn clamp_page(page_index: usize, page_count: usize) -> usize {
    page_index.min(page_count.saturating_sub(1))
}

/// Complete, serializable table state.
///
/// Passed as initial state when building a table and read back with
/// [`TableView::state`](crate::TableView::state). Each dimension is
/// independent of the others.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    /// Sort specification; first entry is the primary key
    pub sorting: Vec<SortEntry>,
    /// Column filters by key; combined with AND
    pub filters: BTreeMap<String, FilterValue>,
    /// Free-text search across filterable columns
    pub global_filter: Option<String>,
    /// Selected row ids
    pub selection: BTreeSet<RowId>,
    /// Column visibility overrides by key
    pub visibility: BTreeMap<String, bool>,
    /// Current page and page size
    pub pagination: Pagination,
}

impl TableState {
    /// Create an empty state (no sort, no filters, first page)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the sort specification
    pub fn with_sorting(mut self, sorting: Vec<SortEntry>) -> Self {
        self.sorting = sorting;
        self
    }

    /// Builder: add a column filter
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Builder: set the global search text
    pub fn with_global_filter(mut self, text: impl Into<String>) -> Self {
        self.global_filter = Some(text.into());
        self
    }

    /// Builder: select rows
    pub fn with_selection<I, R>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RowId>,
    {
        self.selection.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Builder: hide a column
    pub fn with_hidden(mut self, key: impl Into<String>) -> Self {
        self.visibility.insert(key.into(), false);
        self
    }

    /// Builder: set the current page
    pub fn with_page(mut self, page_index: usize) -> Self {
        self.pagination.page_index = page_index;
        self
    }

    /// Builder: set rows per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pagination.page_size = page_size;
        self
    }
}

/// Extracts a stable id from a record.
pub type RowIdFn<T> = Arc<dyn Fn(&T) -> RowId + Send + Sync>;

/// Options for building a [`TableView`](crate::TableView).
pub struct TableOptions<T> {
    /// Initial state
    pub state: TableState,
    /// Row-id accessor; `None` identifies rows by source index
    pub row_id: Option<RowIdFn<T>>,
}

impl<T> Default for TableOptions<T> {
    fn default() -> Self {
        TableOptions {
            state: TableState::default(),
            row_id: None,
        }
    }
}

impl<T> TableOptions<T> {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial state
    pub fn state(mut self, state: TableState) -> Self {
        self.state = state;
        self
    }

    /// Identify rows by a field of the record instead of by position
    pub fn row_id(mut self, row_id: impl Fn(&T) -> RowId + Send + Sync + 'static) -> Self {
        self.row_id = Some(Arc::new(row_id));
        self
    }
}
