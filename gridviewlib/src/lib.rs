//! # gridviewlib
//!
//! Typed table-view state for in-memory record collections: the filtering,
//! sorting, selection, column visibility and pagination behind a data grid,
//! without the grid.
//!
//! ## Overview
//!
//! A [`TableView`] owns a collection of records of any type `T` and a set of
//! [`Column`] descriptors. Columns read values from records through typed
//! accessor functions; the table never inspects `T` directly. Each state
//! dimension is set independently:
//!
//! - **Sorting**: ordered multi-column specification, stable, nulls last
//! - **Filtering**: per-column filters combined with AND, plus a global search
//! - **Selection**: by row id, independent of what is currently visible
//! - **Visibility**: which columns appear in the row projection
//! - **Pagination**: zero-based page index, clamped as the row count changes
//!
//! After every mutation the table recomputes filter → sort, and
//! [`TableView::derived_rows`] returns the current page.
//!
//! ## Pipeline
//!
//! 1. **data**: values, row ids and column descriptors
//! 2. **query**: table state and the pure filter/sort derivation
//! 3. **view**: the stateful controller
//! 4. **output**: string-formatted page snapshot for render layers
//!
//! ## Example
//!
//! ```rust
//! use gridviewlib::{Column, FilterValue, SortEntry, TableView, Value};
//!
//! #[derive(Debug)]
//! struct Product {
//!     name: &'static str,
//!     price: i64,
//!     status: &'static str,
//! }
//!
//! let products = vec![
//!     Product { name: "b", price: 10, status: "A" },
//!     Product { name: "a", price: 10, status: "A" },
//!     Product { name: "z", price: 5, status: "B" },
//! ];
//! let columns = vec![
//!     Column::new("name", |p: &Product| Value::from(p.name)).searchable(),
//!     Column::new("price", |p: &Product| Value::from(p.price)),
//!     Column::new("status", |p: &Product| Value::from(p.status)),
//! ];
//!
//! let mut table = TableView::new(products, columns).unwrap();
//! table
//!     .set_sort(vec![SortEntry::asc("price"), SortEntry::asc("name")])
//!     .unwrap();
//! let names: Vec<_> = table.derived_rows().iter().map(|r| r.record.name).collect();
//! assert_eq!(names, vec!["z", "a", "b"]);
//!
//! table.set_filter("status", Some(FilterValue::from("A"))).unwrap();
//! assert_eq!(table.filtered_count(), 2);
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod query;
pub mod view;

pub use data::{Column, FilterKind, FilterStrategy, RowId, Value};
pub use error::ConfigurationError;
pub use output::{GridRow, GridTable};
pub use query::{
    FilterValue, Pagination, SortDirection, SortEntry, TableOptions, TableState,
    DEFAULT_PAGE_SIZE,
};
pub use view::{Cell, Row, TableView};

/// Result type for gridviewlib operations
pub type Result<T> = std::result::Result<T, ConfigurationError>;
