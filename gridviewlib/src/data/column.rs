//! Column descriptors.
//!
//! A [`Column`] tells the table how to read one field of a record and
//! whether that field takes part in sorting and filtering. Columns are
//! immutable once the table is built.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::query::options::FilterValue;

/// Extracts a cell value from a record.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Orders two records directly, bypassing value comparison.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Caller-defined filter test for [`FilterStrategy::Custom`].
pub type Predicate = Arc<dyn Fn(&Value, &FilterValue) -> bool + Send + Sync>;

/// How a column interprets its filter value.
#[derive(Clone, Default)]
pub enum FilterStrategy {
    /// Cell equals the filter value (numbers compare across int/float)
    #[default]
    Equals,
    /// Case-insensitive substring match on the cell's display text
    Contains,
    /// Glob pattern over the cell's display text
    Glob,
    /// Caller-supplied predicate
    Custom(Predicate),
}

impl FilterStrategy {
    /// Wrap a predicate as a custom strategy
    pub fn custom(
        predicate: impl Fn(&Value, &FilterValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        FilterStrategy::Custom(Arc::new(predicate))
    }

    /// Name of the strategy, as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            FilterStrategy::Equals => "equals",
            FilterStrategy::Contains => "contains",
            FilterStrategy::Glob => "glob",
            FilterStrategy::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializable subset of [`FilterStrategy`] (everything but `Custom`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Equals,
    Contains,
    Glob,
}

impl From<FilterKind> for FilterStrategy {
    fn from(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Equals => FilterStrategy::Equals,
            FilterKind::Contains => FilterStrategy::Contains,
            FilterKind::Glob => FilterStrategy::Glob,
        }
    }
}

/// Describes one column of a table over records of type `T`.
pub struct Column<T> {
    key: String,
    header: String,
    accessor: Accessor<T>,
    comparator: Option<Comparator<T>>,
    filter: FilterStrategy,
    sortable: bool,
    filterable: bool,
    visible: bool,
}

impl<T> Column<T> {
    /// Create a sortable, filterable, visible column.
    ///
    /// The header defaults to the key.
    pub fn new(
        key: impl Into<String>,
        accessor: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        let key = key.into();
        Column {
            header: key.clone(),
            key,
            accessor: Arc::new(accessor),
            comparator: None,
            filter: FilterStrategy::default(),
            sortable: true,
            filterable: true,
            visible: true,
        }
    }

    /// Builder: set the display header
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Builder: set the filter strategy
    pub fn with_filter(mut self, strategy: impl Into<FilterStrategy>) -> Self {
        self.filter = strategy.into();
        self
    }

    /// Builder: order records with a custom comparator instead of by value.
    ///
    /// The comparator sees whole records, so null handling is up to it.
    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    /// Builder: shorthand for the case-insensitive substring strategy
    pub fn searchable(self) -> Self {
        self.with_filter(FilterStrategy::Contains)
    }

    /// Builder: exclude from sorting
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Builder: exclude from filtering (column and global)
    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Builder: start hidden
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Visibility used when the table state has no entry for this column
    pub fn is_visible_by_default(&self) -> bool {
        self.visible
    }

    pub fn filter_strategy(&self) -> &FilterStrategy {
        &self.filter
    }

    pub fn comparator(&self) -> Option<&Comparator<T>> {
        self.comparator.as_ref()
    }

    /// Read this column's value from a record
    pub fn value(&self, record: &T) -> Value {
        (self.accessor)(record)
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Column {
            key: self.key.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            comparator: self.comparator.clone(),
            filter: self.filter.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            visible: self.visible,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("filter", &self.filter)
            .field("custom_comparator", &self.comparator.is_some())
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("visible", &self.visible)
            .finish()
    }
}
