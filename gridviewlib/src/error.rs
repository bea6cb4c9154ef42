//! Error types for gridviewlib

use thiserror::Error;

/// Errors raised by malformed table setup or by mutations that reference
/// columns the table does not know about.
///
/// Every fallible operation on a [`TableView`](crate::TableView) validates
/// before mutating, so receiving one of these means the table state is
/// exactly what it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A table needs at least one column
    #[error("a table needs at least one column")]
    NoColumns,

    /// Two column descriptors share a key
    #[error("duplicate column key '{0}'")]
    DuplicateColumn(String),

    /// Key is not present in the column set
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Column exists but was declared non-sortable
    #[error("column '{0}' is not sortable")]
    NotSortable(String),

    /// Column exists but was declared non-filterable
    #[error("column '{0}' is not filterable")]
    NotFilterable(String),

    /// Glob filter value that does not compile
    #[error("invalid filter pattern '{pattern}' for column '{column}': {message}")]
    InvalidPattern {
        column: String,
        pattern: String,
        message: String,
    },

    /// Page size must be at least one
    #[error("invalid page size {0}: must be at least 1")]
    InvalidPageSize(usize),
}
