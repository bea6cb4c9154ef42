//! View configuration and JSON record access.
//!
//! A view file describes how to turn JSON records into table columns:
//!
//! ```json
//! {
//!   "title": "Pallets",
//!   "id_field": "code",
//!   "columns": [
//!     { "key": "code", "header": "Code", "filter": "glob" },
//!     { "key": "client", "field": "/client/name", "filter": "contains" },
//!     { "key": "weight", "header": "Weight (kg)" },
//!     { "key": "notes", "hidden": true, "sortable": false }
//!   ],
//!   "sort": [{ "key": "weight", "direction": "descending" }],
//!   "page_size": 20
//! }
//! ```
//!
//! Without a view file, columns are inferred from the first record's keys.

use std::path::Path;

use anyhow::{bail, Context};
use gridviewlib::{Column, FilterKind, FilterValue, RowId, SortEntry, TableState, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Column definition from a view file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Column key used by --sort/--filter/--hide
    pub key: String,
    /// Display header (defaults to the key)
    #[serde(default)]
    pub header: Option<String>,
    /// Record field: a top-level key or a JSON pointer (defaults to the key)
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default = "enabled")]
    pub sortable: bool,
    #[serde(default = "enabled")]
    pub filterable: bool,
    /// Filter strategy
    #[serde(default)]
    pub filter: FilterKind,
    /// Start hidden
    #[serde(default)]
    pub hidden: bool,
}

fn enabled() -> bool {
    true
}

impl ColumnConfig {
    /// Column over a top-level key with default settings
    pub fn for_key(key: impl Into<String>) -> Self {
        ColumnConfig {
            key: key.into(),
            header: None,
            field: None,
            sortable: true,
            filterable: true,
            filter: FilterKind::default(),
            hidden: false,
        }
    }

    /// Build the library column for JSON records
    pub fn to_column(&self) -> Column<Json> {
        let field = self.field.clone().unwrap_or_else(|| self.key.clone());
        let mut column = Column::new(self.key.clone(), move |record: &Json| {
            field_value(record, &field)
        })
        .with_header(self.header.clone().unwrap_or_else(|| self.key.clone()))
        .with_filter(self.filter);

        if !self.sortable {
            column = column.not_sortable();
        }
        if !self.filterable {
            column = column.not_filterable();
        }
        if self.hidden {
            column = column.hidden();
        }
        column
    }
}

/// A view file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Title printed above the table
    pub title: Option<String>,
    /// Field identifying records for selection (defaults to position)
    pub id_field: Option<String>,
    /// Columns in display order; inferred when empty
    pub columns: Vec<ColumnConfig>,
    /// Default sort
    pub sort: Vec<SortEntry>,
    /// Default page size
    pub page_size: Option<usize>,
}

impl ViewConfig {
    /// Load a view file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read view file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid view file '{}'", path.display()))
    }

    /// Column configs, inferring them from the first record if none are set
    pub fn column_configs(&self, records: &[Json]) -> Vec<ColumnConfig> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        records
            .first()
            .and_then(Json::as_object)
            .map(|obj| obj.keys().map(ColumnConfig::for_key).collect())
            .unwrap_or_default()
    }

    /// Library columns for the given records
    pub fn columns(&self, records: &[Json]) -> Vec<Column<Json>> {
        self.column_configs(records)
            .iter()
            .map(ColumnConfig::to_column)
            .collect()
    }

    /// Initial table state from the view defaults
    pub fn initial_state(&self) -> TableState {
        let mut state = TableState::new().with_sorting(self.sort.clone());
        if let Some(size) = self.page_size {
            state = state.with_page_size(size);
        }
        state
    }

    /// Filter kind of a configured column (`Equals` for inferred columns)
    pub fn filter_kind(&self, key: &str) -> FilterKind {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.filter)
            .unwrap_or_default()
    }
}

/// Load a JSON array of records from a file, or stdin when `path` is `-`.
pub fn load_records(path: &str) -> anyhow::Result<Vec<Json>> {
    let text = if path == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read records from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read records file '{}'", path))?
    };
    let parsed: Json = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in records file '{}'", path))?;
    match parsed {
        Json::Array(records) => Ok(records),
        _ => bail!("records file '{}' must contain a JSON array", path),
    }
}

/// Read a field from a record by top-level key or JSON pointer.
pub fn field_value(record: &Json, field: &str) -> Value {
    let raw = if field.starts_with('/') {
        record.pointer(field)
    } else {
        record.get(field)
    };
    raw.map(json_to_value).unwrap_or(Value::Null)
}

/// Convert a JSON value to a cell value. Arrays and objects become text.
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Row id accessor over a record field
pub fn row_id_for(field: String) -> impl Fn(&Json) -> RowId + Send + Sync + 'static {
    move |record: &Json| RowId::from(field_value(record, &field).to_string())
}

/// Parse a command-line filter value for a column.
///
/// Values stay text: the table reads text filters as the cell's kind, so
/// `lote=001` matches the string `"001"` and `weight=95` matches the number
/// 95. On `equals` columns, `min..max` with numeric bounds (either side may
/// be empty) is a range and `a|b|c` lists alternatives. `contains` and
/// `glob` columns take the raw text.
pub fn parse_filter_value(raw: &str, kind: FilterKind) -> FilterValue {
    if kind != FilterKind::Equals {
        return FilterValue::from(raw);
    }
    if let Some((lo, hi)) = raw.split_once("..") {
        let bound = |s: &str| -> Option<Option<Value>> {
            if s.is_empty() {
                Some(None)
            } else {
                parse_number(s).map(Some)
            }
        };
        if let (Some(min), Some(max)) = (bound(lo), bound(hi)) {
            if min.is_some() || max.is_some() {
                return FilterValue::range(min, max);
            }
        }
    }
    if raw.contains('|') {
        return FilterValue::one_of(raw.split('|'));
    }
    FilterValue::from(raw)
}

/// Parse a numeric range bound.
pub fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::Int(i));
    }
    // Reject "inf"/"NaN" and friends
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<f64>().ok().map(Value::Float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_key_and_pointer() {
        let record = json!({"code": "T-01", "client": {"name": "Norte"}, "weight": 480.5});
        assert_eq!(field_value(&record, "code"), Value::from("T-01"));
        assert_eq!(field_value(&record, "/client/name"), Value::from("Norte"));
        assert_eq!(field_value(&record, "weight"), Value::Float(480.5));
        assert_eq!(field_value(&record, "missing"), Value::Null);
        assert_eq!(field_value(&record, "/client/missing"), Value::Null);
    }

    #[test]
    fn test_json_to_value() {
        assert_eq!(json_to_value(&json!(null)), Value::Null);
        assert_eq!(json_to_value(&json!(3)), Value::Int(3));
        assert_eq!(json_to_value(&json!(true)), Value::Bool(true));
        assert_eq!(json_to_value(&json!([1, 2])), Value::from("[1,2]"));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(Value::Int(42)));
        assert_eq!(parse_number("-1.5"), Some(Value::Float(-1.5)));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("A"), None);
    }

    #[test]
    fn test_parse_filter_value() {
        assert_eq!(
            parse_filter_value("100..500", FilterKind::Equals),
            FilterValue::range(Some(Value::Int(100)), Some(Value::Int(500)))
        );
        assert_eq!(
            parse_filter_value("..2.5", FilterKind::Equals),
            FilterValue::range(None, Some(Value::Float(2.5)))
        );
        assert_eq!(
            parse_filter_value("A|C", FilterKind::Equals),
            FilterValue::one_of(["A", "C"])
        );
        assert_eq!(
            parse_filter_value("a..b", FilterKind::Equals),
            FilterValue::from("a..b")
        );
        assert_eq!(
            parse_filter_value("007", FilterKind::Contains),
            FilterValue::from("007")
        );
        // Zero-padded and boolean-looking text is not retyped
        assert_eq!(parse_filter_value("001", FilterKind::Equals), FilterValue::from("001"));
        assert_eq!(parse_filter_value("true", FilterKind::Equals), FilterValue::from("true"));
    }

    #[test]
    fn test_inferred_columns() {
        let records = vec![json!({"b": 1, "a": "x"})];
        let config = ViewConfig::default();
        let keys: Vec<String> = config
            .column_configs(&records)
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(config.column_configs(&[]).is_empty());
    }

    #[test]
    fn test_view_config_parse() {
        let config: ViewConfig = serde_json::from_value(json!({
            "id_field": "code",
            "columns": [
                {"key": "code", "header": "Code", "filter": "glob"},
                {"key": "notes", "hidden": true, "sortable": false}
            ],
            "sort": [{"key": "code", "direction": "descending"}],
            "page_size": 5
        }))
        .unwrap();

        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.filter_kind("code"), FilterKind::Glob);
        assert_eq!(config.filter_kind("other"), FilterKind::Equals);
        assert!(config.columns[1].hidden);
        assert!(!config.columns[1].sortable);
        assert!(config.columns[1].filterable);

        let state = config.initial_state();
        assert_eq!(state.sorting, vec![SortEntry::desc("code")]);
        assert_eq!(state.pagination.page_size, 5);

        let columns = config.columns(&[]);
        assert_eq!(columns[0].header(), "Code");
        assert!(!columns[1].is_visible_by_default());
    }

    #[test]
    fn test_row_id_for() {
        let id = row_id_for("code".to_string());
        assert_eq!(id(&json!({"code": "T-9"})), RowId::from("T-9"));
        assert_eq!(id(&json!({"code": 12})), RowId::from("12"));
    }
}
