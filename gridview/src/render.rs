//! Template rendering for CLI output using outstanding

use console::Style;
use gridviewlib::{GridRow, GridTable};
use outstanding::Theme;
use serde::Serialize;

/// Include template at compile time
const GRID_TABLE_TEMPLATE: &str = include_str!("../templates/grid_table.jinja");

/// Cells wider than this are truncated
const MAX_CELL_WIDTH: usize = 40;

/// Gap between columns
const COLUMN_GAP: &str = "  ";

/// Data context for the grid table template (all lines pre-padded)
#[derive(Debug, Serialize)]
struct GridTableContext {
    title: Option<String>,
    header: String,
    separator: String,
    rows: Vec<String>,
    footer: String,
}

/// Create the theme with styles (`header` styles the column header line)
fn create_theme() -> Theme {
    Theme::new().add("header", Style::new().bold())
}

/// Truncate a cell to `max_len` characters, adding a ".." suffix if needed
fn truncate_cell(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        let head: String = text.chars().take(max_len.saturating_sub(2)).collect();
        format!("{head}..")
    } else {
        text.to_string()
    }
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

/// Numeric columns are right-aligned
fn is_numeric_column(rows: &[GridRow], column: usize) -> bool {
    let mut any = false;
    for row in rows {
        match row.values.get(column).map(String::as_str) {
            Some("") | None => {}
            Some(v) if v.parse::<f64>().is_ok() => any = true,
            Some(_) => return false,
        }
    }
    any
}

fn build_context(table: &GridTable) -> GridTableContext {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.values
                .iter()
                .map(|v| truncate_cell(v, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let right: Vec<bool> = (0..table.headers.len())
        .map(|i| is_numeric_column(&table.rows, i))
        .collect();

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(widths.iter().zip(&right))
            .map(|(v, (w, r))| pad(v, *w, *r))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
            .trim_end()
            .to_string()
    };

    // Two leading characters hold the selection marker
    let header = format!("  {}", line(&table.headers));
    let width = 2 + widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
    let rows = table
        .rows
        .iter()
        .zip(&cells)
        .map(|(row, values)| {
            let marker = if row.selected { '*' } else { ' ' };
            format!("{} {}", marker, line(values))
        })
        .collect();

    GridTableContext {
        title: table.title.clone(),
        header,
        separator: "-".repeat(width),
        rows,
        footer: table.footer.clone(),
    }
}

/// Render a page snapshot as an aligned text table
pub fn render_table(table: &GridTable) -> anyhow::Result<String> {
    let value = serde_json::to_value(build_context(table))?;
    outstanding::render(GRID_TABLE_TEMPLATE, &value, &create_theme())
        .map_err(|e| anyhow::anyhow!("failed to render table: {e}"))
}
