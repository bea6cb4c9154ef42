//! Output formatting: present the current page as a table.
//!
//! This module handles the final stage of the pipeline - formatting a
//! table view's current page for display. It provides:
//!
//! - **GridTable**: Table-ready data structure with headers, rows, and footer
//! - **GridRow**: Individual row with id, selection flag and formatted values
//!
//! GridTable is a pure presentation layer - it only formats data into strings.
//! All filtering, sorting and pagination happens in the view.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridviewlib::output::GridTable;
//!
//! let table = GridTable::from_view(&view);
//! // table.headers: ["Code", "Status", "Weight"]
//! // table.rows: [GridRow { id: "T-01", selected: false, values: ["T-01", "A", "480"] }]
//! // table.footer: "Page 1 of 3 (25 of 40 rows, 2 selected)"
//! ```

pub mod table;

pub use table::{GridRow, GridTable};
