//! Table-ready data structures for rendering.
//!
//! This module provides `GridTable`, a presentation-ready snapshot of the
//! current page that can be consumed directly by templates or serialized
//! to JSON.
//!
//! The data flow is:
//! 1. Records + Columns (caller supplied)
//! 2. TableView (filtered, sorted, paginated, selection-annotated)
//! 3. GridTable (formatted strings for display)
//!
//! GridTable is a pure presentation layer - it only formats data, no filtering
//! or sorting logic. All computation happens in the TableView.

use serde::{Deserialize, Serialize};

use crate::data::Value;
use crate::view::TableView;

/// A single formatted data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    /// Row id
    pub id: String,
    /// Whether the row is selected
    pub selected: bool,
    /// Values for each visible column (as strings, ready for display)
    pub values: Vec<String>,
}

/// Table-ready page data.
///
/// This is the final data structure before presentation. Templates
/// iterate over headers/rows/footer and apply formatting - no computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridTable {
    /// Optional title (e.g., "Pallets")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Headers of the visible columns
    pub headers: Vec<String>,
    /// Rows of the current page
    pub rows: Vec<GridRow>,
    /// Summary line (page position, counts, selection)
    pub footer: String,
}

impl GridTable {
    /// Snapshot the current page of a table.
    pub fn from_view<T>(view: &TableView<T>) -> Self {
        let headers = view
            .visible_columns()
            .iter()
            .map(|c| c.header().to_string())
            .collect();
        let rows = view
            .derived_rows()
            .into_iter()
            .map(|row| GridRow {
                id: row.id.to_string(),
                selected: row.selected,
                values: row.cells.iter().map(|c| format_value(&c.value)).collect(),
            })
            .collect();

        GridTable {
            title: None,
            headers,
            rows,
            footer: build_footer(
                view.page_index(),
                view.page_count(),
                view.filtered_count(),
                view.total_count(),
                view.selected_ids().len(),
            ),
        }
    }

    /// Builder: set a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Format a cell for display. Nulls render empty.
fn format_value(value: &Value) -> String {
    match value {
        Value::Float(v) if v.fract() != 0.0 => format!("{:.2}", v),
        other => other.to_string(),
    }
}

/// Build the footer line. Pages are shown one-based.
fn build_footer(
    page_index: usize,
    page_count: usize,
    filtered: usize,
    total: usize,
    selected: usize,
) -> String {
    if page_count == 0 {
        return format!("No matching rows ({} total, {} selected)", total, selected);
    }
    format!(
        "Page {} of {} ({} of {} rows, {} selected)",
        page_index + 1,
        page_count,
        filtered,
        total,
        selected
    )
}
