//! Query processing: table state, filters, and the derivation pipeline.
//!
//! This module turns a record collection plus a [`TableState`] into an
//! ordered list of source indices. It provides:
//!
//! - **Options**: Serializable state (`SortEntry`, `FilterValue`, `Pagination`, `TableState`)
//! - **Matcher**: Compiled per-column filters
//! - **Pipeline**: Validation, filter compilation, pure filter → sort derivation and page slicing
//!
//! ## Example
//!
//! ```rust
//! use gridviewlib::data::{Column, Value};
//! use gridviewlib::query::{derive_indices, SortEntry, TableState};
//!
//! type Product = (&'static str, i64);
//!
//! let records: Vec<Product> = vec![("b", 10), ("a", 10), ("z", 5)];
//! let columns = vec![
//!     Column::new("name", |r: &Product| Value::from(r.0)),
//!     Column::new("price", |r: &Product| Value::from(r.1)),
//! ];
//! let sorting = vec![SortEntry::asc("price"), SortEntry::asc("name")];
//! let state = TableState::new().with_sorting(sorting);
//!
//! assert_eq!(derive_indices(&records, &columns, &state).unwrap(), vec![2, 1, 0]);
//! ```

pub mod matcher;
pub mod options;
pub mod pipeline;

pub use matcher::Matcher;
pub use options::{
    clamp_page, page_count, FilterValue, Pagination, RowIdFn, SortDirection, SortEntry,
    TableOptions, TableState, DEFAULT_PAGE_SIZE,
};
pub use pipeline::{
    compare_nulls_last, compile_filters, derive_indices, derive_with_filters, page_range,
    validate_sorting, CompiledFilters,
};
