//! The table view controller.
//!
//! [`TableView`] owns a record collection, its column descriptors and a
//! [`TableState`]. Every mutation validates first, then updates one state
//! dimension and eagerly recomputes the derived order. Reads never mutate.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::data::{Column, RowId, Value};
use crate::error::ConfigurationError;
use crate::query::options::{
    clamp_page, page_count, FilterValue, RowIdFn, SortEntry, TableOptions, TableState,
};
use crate::query::pipeline::{
    column_position, compile_filter, compile_filters, derive_with_filters, filterable_position,
    page_range, validate_sorting, CompiledFilters,
};
use crate::Result;

/// One visible cell of a derived row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Column key
    pub key: String,
    /// Extracted value
    pub value: Value,
}

/// A record after filter, sort and pagination.
#[derive(Debug, Clone, Serialize)]
pub struct Row<'a, T> {
    /// Row identity (used for selection)
    pub id: RowId,
    /// Position of the record in the source collection
    pub index: usize,
    /// The record itself
    #[serde(skip)]
    pub record: &'a T,
    /// Whether the row is selected
    pub selected: bool,
    /// Cells for the visible columns, in column order
    pub cells: Vec<Cell>,
}

impl<T> Row<'_, T> {
    /// Value of a visible cell by column key
    pub fn cell(&self, key: &str) -> Option<&Value> {
        self.cells.iter().find(|c| c.key == key).map(|c| &c.value)
    }
}

/// Filter, sort, select and paginate an in-memory record collection.
///
/// # Example
///
/// ```rust
/// use gridviewlib::{Column, FilterValue, SortEntry, TableView, Value};
///
/// struct Pallet {
///     code: String,
///     status: &'static str,
///     weight: f64,
/// }
///
/// let pallets = vec![
///     Pallet { code: "T-01".into(), status: "stored", weight: 480.0 },
///     Pallet { code: "T-02".into(), status: "shipped", weight: 510.5 },
///     Pallet { code: "T-03".into(), status: "stored", weight: 300.0 },
/// ];
/// let columns = vec![
///     Column::new("code", |p: &Pallet| Value::from(&p.code)),
///     Column::new("status", |p: &Pallet| Value::from(p.status)),
///     Column::new("weight", |p: &Pallet| Value::from(p.weight)),
/// ];
///
/// let mut table = TableView::new(pallets, columns).unwrap();
/// table.set_filter("status", Some(FilterValue::from("stored"))).unwrap();
/// table.set_sort(vec![SortEntry::asc("weight")]).unwrap();
///
/// let codes: Vec<String> = table
///     .derived_rows()
///     .iter()
///     .map(|row| row.record.code.clone())
///     .collect();
/// assert_eq!(codes, vec!["T-03", "T-01"]);
/// ```
pub struct TableView<T> {
    records: Vec<T>,
    columns: Vec<Column<T>>,
    row_id: Option<RowIdFn<T>>,
    ids: Vec<RowId>,
    state: TableState,
    /// Matchers for `state.filters`, compiled when a filter is set
    filters: CompiledFilters,
    /// Filtered and sorted source indices
    derived: Vec<usize>,
}

impl<T> TableView<T> {
    /// Create a table with default state.
    ///
    /// Fails if `columns` is empty or two columns share a key.
    pub fn new(records: Vec<T>, columns: Vec<Column<T>>) -> Result<Self> {
        Self::with_options(records, columns, TableOptions::new())
    }

    /// Create a table with an initial state and/or a row-id accessor.
    ///
    /// The initial state is validated like the individual setters would
    /// validate it. Null filter values are dropped, selected ids not present
    /// in `records` are dropped and the page index is clamped.
    pub fn with_options(
        records: Vec<T>,
        columns: Vec<Column<T>>,
        options: TableOptions<T>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(ConfigurationError::NoColumns);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.key()) {
                return Err(ConfigurationError::DuplicateColumn(column.key().to_string()));
            }
        }

        let TableOptions { mut state, row_id } = options;
        state.filters.retain(|_, value| !value.is_null());
        validate_sorting(&columns, &state.sorting)?;
        let filters = compile_filters(&columns, &state)?;
        for key in state.visibility.keys() {
            column_position(&columns, key)?;
        }
        if state.pagination.page_size == 0 {
            return Err(ConfigurationError::InvalidPageSize(0));
        }

        let ids = compute_ids(&records, row_id.as_ref());
        let mut table = TableView {
            records,
            columns,
            row_id,
            ids,
            state: TableState::default(),
            filters,
            derived: Vec::new(),
        };

        let selection = table.known_ids(state.selection.iter().cloned());
        table.state = TableState {
            selection,
            global_filter: normalize_search(state.global_filter),
            ..state
        };
        table.recompute();

        debug!(
            records = table.records.len(),
            columns = table.columns.len(),
            "table initialized"
        );
        Ok(table)
    }

    // ---------------------------------------------------------------------
    // Sorting and filtering
    // ---------------------------------------------------------------------

    /// Replace the sort specification. An empty list restores source order.
    pub fn set_sort(&mut self, sorting: Vec<SortEntry>) -> Result<()> {
        validate_sorting(&self.columns, &sorting)?;
        trace!(?sorting, "set sort");
        self.state.sorting = sorting;
        self.recompute();
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) the filter on one column.
    ///
    /// A null value clears the filter like `None` does.
    pub fn set_filter(&mut self, key: &str, value: Option<FilterValue>) -> Result<()> {
        match value.filter(|v| !v.is_null()) {
            Some(value) => {
                let (position, matcher) = compile_filter(&self.columns, key, &value)?;
                trace!(key, ?value, "set filter");
                self.filters.retain(|(p, _)| *p != position);
                self.filters.push((position, matcher));
                self.state.filters.insert(key.to_string(), value);
            }
            None => {
                let position = filterable_position(&self.columns, key)?;
                trace!(key, "clear filter");
                self.filters.retain(|(p, _)| *p != position);
                self.state.filters.remove(key);
            }
        }
        self.recompute();
        Ok(())
    }

    /// Set or clear the free-text search. Blank text clears it.
    pub fn set_global_filter(&mut self, text: Option<String>) {
        self.state.global_filter = normalize_search(text);
        trace!(global_filter = ?self.state.global_filter, "set global filter");
        self.recompute();
    }

    /// Remove every column filter and the global search.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.state.filters.clear();
        self.state.global_filter = None;
        self.recompute();
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Replace the selection. Ids not present in the source are ignored.
    pub fn set_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = RowId>,
    {
        self.state.selection = self.known_ids(ids);
    }

    /// Flip the selection of one row and return its new state.
    ///
    /// Unknown ids are ignored and report `false`.
    pub fn toggle_selection(&mut self, id: &RowId) -> bool {
        if !self.ids.contains(id) {
            warn!(id = %id, "toggle ignored: id not in source");
            return false;
        }
        if self.state.selection.remove(id) {
            false
        } else {
            self.state.selection.insert(id.clone());
            true
        }
    }

    /// Add every row passing the current filters (all pages) to the selection.
    pub fn select_all_filtered(&mut self) {
        let ids: Vec<RowId> = self.derived.iter().map(|&i| self.ids[i].clone()).collect();
        self.state.selection.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    /// Whether a row is selected, regardless of whether it is currently visible
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.state.selection.contains(id)
    }

    pub fn selected_ids(&self) -> &BTreeSet<RowId> {
        &self.state.selection
    }

    /// Selected records in source order, ignoring filters and pagination
    pub fn selected_records(&self) -> Vec<&T> {
        self.records
            .iter()
            .zip(&self.ids)
            .filter(|(_, id)| self.state.selection.contains(*id))
            .map(|(record, _)| record)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Visibility
    // ---------------------------------------------------------------------

    /// Show or hide a column. Hidden columns stay sortable and filterable.
    pub fn set_column_visibility(&mut self, key: &str, visible: bool) -> Result<()> {
        self.column_index(key)?;
        self.state.visibility.insert(key.to_string(), visible);
        Ok(())
    }

    /// Whether a column is part of the row projection. Unknown keys are not.
    pub fn is_column_visible(&self, key: &str) -> bool {
        self.column(key).is_some_and(|c| self.visible(c))
    }

    /// Visible columns in declaration order
    pub fn visible_columns(&self) -> Vec<&Column<T>> {
        self.columns.iter().filter(|c| self.visible(c)).collect()
    }

    // ---------------------------------------------------------------------
    // Pagination
    // ---------------------------------------------------------------------

    /// Move to a page. Out-of-range indices are clamped, never rejected.
    pub fn set_page(&mut self, page_index: usize) {
        self.state.pagination.page_index = clamp_page(page_index, self.page_count());
    }

    /// Change the page size and re-clamp the current page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(ConfigurationError::InvalidPageSize(page_size));
        }
        self.state.pagination.page_size = page_size;
        self.clamp_current_page();
        Ok(())
    }

    /// Advance one page; returns false if already on the last page
    pub fn next_page(&mut self) -> bool {
        let current = self.page_index();
        self.set_page(current.saturating_add(1));
        self.page_index() != current
    }

    /// Go back one page; returns false if already on the first page
    pub fn previous_page(&mut self) -> bool {
        let current = self.page_index();
        self.set_page(current.saturating_sub(1));
        self.page_index() != current
    }

    pub fn page_index(&self) -> usize {
        self.state.pagination.page_index
    }

    pub fn page_size(&self) -> usize {
        self.state.pagination.page_size
    }

    /// Number of pages for the filtered rows; zero when nothing matches
    pub fn page_count(&self) -> usize {
        page_count(self.derived.len(), self.page_size())
    }

    // ---------------------------------------------------------------------
    // Derived data
    // ---------------------------------------------------------------------

    /// Rows of the current page, after filter → sort → paginate.
    pub fn derived_rows(&self) -> Vec<Row<'_, T>> {
        let range = page_range(self.derived.len(), self.page_index(), self.page_size());
        let visible = self.visible_columns();

        self.derived[range]
            .iter()
            .map(|&index| {
                let record = &self.records[index];
                let id = self.ids[index].clone();
                Row {
                    selected: self.state.selection.contains(&id),
                    id,
                    index,
                    record,
                    cells: visible
                        .iter()
                        .map(|column| Cell {
                            key: column.key().to_string(),
                            value: column.value(record),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Filtered and sorted source indices across all pages
    pub fn filtered_indices(&self) -> &[usize] {
        &self.derived
    }

    /// Number of rows passing the filters
    pub fn filtered_count(&self) -> usize {
        self.derived.len()
    }

    /// Number of records in the source
    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Distinct non-null values of a column with their counts, over the full
    /// source, ordered by value.
    pub fn facets(&self, key: &str) -> Result<Vec<(Value, usize)>> {
        let column = &self.columns[self.column_index(key)?];
        let mut values: Vec<Value> = self
            .records
            .iter()
            .map(|r| column.value(r))
            .filter(|v| !v.is_null())
            .collect();
        values.sort_by(|a, b| a.compare(b));

        let mut facets: Vec<(Value, usize)> = Vec::new();
        for value in values {
            if let Some((last, count)) = facets.last_mut() {
                if last.compare(&value).is_eq() {
                    *count += 1;
                    continue;
                }
            }
            facets.push((value, 1));
        }
        Ok(facets)
    }

    // ---------------------------------------------------------------------
    // Source and accessors
    // ---------------------------------------------------------------------

    /// Replace the record source, e.g. after refetching.
    ///
    /// Sort, filters and visibility are kept and the page index is clamped.
    /// With a row-id accessor, selection keeps only ids that still exist.
    /// Without one, ids are positions and cannot follow records into a new
    /// source, so the selection is cleared.
    pub fn set_records(&mut self, records: Vec<T>) {
        self.ids = compute_ids(&records, self.row_id.as_ref());
        self.records = records;
        let previous = std::mem::take(&mut self.state.selection);
        if self.row_id.is_none() {
            if !previous.is_empty() {
                warn!(
                    count = previous.len(),
                    "selection cleared: positional row ids do not survive a record refresh"
                );
            }
        } else {
            self.state.selection = self.known_ids(previous);
        }
        self.recompute();
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.key() == key)
    }

    /// Row id of a source record
    pub fn row_id(&self, index: usize) -> Option<&RowId> {
        self.ids.get(index)
    }

    /// Current state snapshot
    pub fn state(&self) -> &TableState {
        &self.state
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn recompute(&mut self) {
        self.derived = derive_with_filters(&self.records, &self.columns, &self.filters, &self.state);
        self.clamp_current_page();
        debug!(
            filtered = self.derived.len(),
            total = self.records.len(),
            page = self.page_index(),
            "recomputed rows"
        );
    }

    fn clamp_current_page(&mut self) {
        self.state.pagination.page_index = clamp_page(self.page_index(), self.page_count());
    }

    fn visible(&self, column: &Column<T>) -> bool {
        self.state
            .visibility
            .get(column.key())
            .copied()
            .unwrap_or_else(|| column.is_visible_by_default())
    }

    fn column_index(&self, key: &str) -> Result<usize> {
        column_position(&self.columns, key)
    }

    fn known_ids<I>(&self, ids: I) -> BTreeSet<RowId>
    where
        I: IntoIterator<Item = RowId>,
    {
        let present: HashSet<&RowId> = self.ids.iter().collect();
        let (known, dropped): (BTreeSet<RowId>, Vec<RowId>) =
            ids.into_iter().fold((BTreeSet::new(), Vec::new()), |mut acc, id| {
                if present.contains(&id) {
                    acc.0.insert(id);
                } else {
                    acc.1.push(id);
                }
                acc
            });
        if !dropped.is_empty() {
            warn!(count = dropped.len(), ?dropped, "selection ids not in source");
        }
        known
    }
}

fn compute_ids<T>(records: &[T], row_id: Option<&RowIdFn<T>>) -> Vec<RowId> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| match row_id {
            Some(f) => f(record),
            None => RowId::from(i),
        })
        .collect()
}

fn normalize_search(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FilterStrategy;

    #[derive(Debug, Clone, PartialEq)]
    struct Pallet {
        code: String,
        status: &'static str,
        product: &'static str,
        weight: Option<f64>,
    }

    fn pallet(
        code: &str,
        status: &'static str,
        product: &'static str,
        weight: Option<f64>,
    ) -> Pallet {
        Pallet {
            code: code.to_string(),
            status,
            product,
            weight,
        }
    }

    fn columns() -> Vec<Column<Pallet>> {
        vec![
            Column::new("code", |p: &Pallet| Value::from(&p.code)).with_header("Code"),
            Column::new("status", |p: &Pallet| Value::from(p.status)),
            Column::new("product", |p: &Pallet| Value::from(p.product)).searchable(),
            Column::new("weight", |p: &Pallet| Value::from(p.weight)),
        ]
    }

    fn pallets() -> Vec<Pallet> {
        vec![
            pallet("T-01", "A", "Caja 30x30", Some(480.0)),
            pallet("T-02", "B", "Caja 40x40", Some(510.5)),
            pallet("T-03", "A", "Bolsa", None),
            pallet("T-04", "C", "Caja 30x30", Some(300.0)),
            pallet("T-05", "B", "Film", Some(120.0)),
        ]
    }

    fn table() -> TableView<Pallet> {
        TableView::with_options(
            pallets(),
            columns(),
            TableOptions::new().row_id(|p: &Pallet| RowId::from(p.code.as_str())),
        )
        .unwrap()
    }

    fn codes(table: &TableView<Pallet>) -> Vec<String> {
        table
            .derived_rows()
            .iter()
            .map(|r| r.record.code.clone())
            .collect()
    }

    fn all_codes(table: &TableView<Pallet>) -> Vec<String> {
        table
            .filtered_indices()
            .iter()
            .map(|&i| table.records()[i].code.clone())
            .collect()
    }

    #[test]
    fn test_initialize_returns_all_in_order() {
        let table = table();
        assert_eq!(codes(&table), vec!["T-01", "T-02", "T-03", "T-04", "T-05"]);
        assert_eq!(table.filtered_count(), 5);
        assert_eq!(table.total_count(), 5);
        assert_eq!(table.page_count(), 1);
    }

    #[test]
    fn test_initialize_paginates() {
        let table = TableView::with_options(
            pallets(),
            columns(),
            TableOptions::new().state(TableState::new().with_page_size(2)),
        )
        .unwrap();
        assert_eq!(table.page_count(), 3);
        let rows = table.derived_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[1].index, 1);
    }

    #[test]
    fn test_empty_columns_rejected() {
        let err = TableView::new(pallets(), Vec::new()).err().unwrap();
        assert_eq!(err, ConfigurationError::NoColumns);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut cols = columns();
        cols.push(Column::new("status", |p: &Pallet| Value::from(p.product)));
        let err = TableView::new(pallets(), cols).err().unwrap();
        assert_eq!(err, ConfigurationError::DuplicateColumn("status".to_string()));
    }

    #[test]
    fn test_initial_state_validated() {
        let state = TableState::new().with_sorting(vec![SortEntry::asc("missing")]);
        let err = TableView::with_options(pallets(), columns(), TableOptions::new().state(state))
            .err()
            .unwrap();
        assert_eq!(err, ConfigurationError::UnknownColumn("missing".to_string()));

        let state = TableState::new().with_page_size(0);
        let err = TableView::with_options(pallets(), columns(), TableOptions::new().state(state))
            .err()
            .unwrap();
        assert_eq!(err, ConfigurationError::InvalidPageSize(0));
    }

    #[test]
    fn test_initial_state_applied() {
        let state = TableState::new()
            .with_filter("status", "A")
            .with_sorting(vec![SortEntry::desc("code")])
            .with_selection(["T-03", "T-99"])
            .with_page(7);
        let table = TableView::with_options(
            pallets(),
            columns(),
            TableOptions::new()
                .state(state)
                .row_id(|p: &Pallet| RowId::from(p.code.as_str())),
        )
        .unwrap();

        assert_eq!(codes(&table), vec!["T-03", "T-01"]);
        assert_eq!(table.page_index(), 0);
        // Unknown id dropped
        assert_eq!(table.selected_ids().len(), 1);
        assert!(table.is_selected(&RowId::from("T-03")));
    }

    #[test]
    fn test_filter_scenario() {
        let mut table = table();
        table
            .set_filter("status", Some(FilterValue::from("A")))
            .unwrap();
        assert_eq!(codes(&table), vec!["T-01", "T-03"]);
    }

    #[test]
    fn test_filter_then_unfilter_restores() {
        let mut table = table();
        table.set_sort(vec![SortEntry::desc("weight")]).unwrap();
        let before = codes(&table);

        table
            .set_filter("product", Some(FilterValue::from("caja")))
            .unwrap();
        assert_eq!(codes(&table), vec!["T-02", "T-01", "T-04"]);

        table.set_filter("product", None).unwrap();
        assert_eq!(codes(&table), before);
    }

    #[test]
    fn test_sort_then_unsort_restores() {
        let mut table = table();
        table
            .set_filter("status", Some(FilterValue::one_of(["A", "B"])))
            .unwrap();
        let before = codes(&table);

        table
            .set_sort(vec![SortEntry::desc("weight"), SortEntry::asc("code")])
            .unwrap();
        assert_ne!(codes(&table), before);

        table.set_sort(Vec::new()).unwrap();
        assert_eq!(codes(&table), before);
    }

    #[test]
    fn test_sort_nulls_last() {
        let mut table = table();
        table.set_sort(vec![SortEntry::asc("weight")]).unwrap();
        assert_eq!(codes(&table), vec!["T-05", "T-04", "T-01", "T-02", "T-03"]);
        table.set_sort(vec![SortEntry::desc("weight")]).unwrap();
        assert_eq!(codes(&table), vec!["T-02", "T-01", "T-04", "T-05", "T-03"]);
    }

    #[test]
    fn test_unknown_key_leaves_state_unchanged() {
        let mut table = table();
        table.set_sort(vec![SortEntry::asc("code")]).unwrap();
        table
            .set_filter("status", Some(FilterValue::from("B")))
            .unwrap();
        let before = table.state().clone();

        let err = table
            .set_sort(vec![SortEntry::desc("weight"), SortEntry::asc("nope")])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownColumn("nope".to_string()));
        assert_eq!(table.state(), &before);

        let err = table
            .set_filter("nope", Some(FilterValue::from("x")))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownColumn("nope".to_string()));
        assert!(table.set_filter("nope", None).is_err());
        assert!(table.set_column_visibility("nope", false).is_err());
        assert_eq!(table.state(), &before);
        assert_eq!(codes(&table), vec!["T-02", "T-05"]);
    }

    #[test]
    fn test_non_sortable_and_non_filterable() {
        let cols = vec![
            Column::new("code", |p: &Pallet| Value::from(&p.code)),
            Column::new("status", |p: &Pallet| Value::from(p.status))
                .not_sortable()
                .not_filterable(),
        ];
        let mut table = TableView::new(pallets(), cols).unwrap();
        assert_eq!(
            table.set_sort(vec![SortEntry::asc("status")]).unwrap_err(),
            ConfigurationError::NotSortable("status".to_string())
        );
        assert_eq!(
            table
                .set_filter("status", Some(FilterValue::from("A")))
                .unwrap_err(),
            ConfigurationError::NotFilterable("status".to_string())
        );
    }

    #[test]
    fn test_invalid_glob_leaves_state_unchanged() {
        let cols = vec![Column::new("code", |p: &Pallet| Value::from(&p.code))
            .with_filter(FilterStrategy::Glob)];
        let mut table = TableView::new(pallets(), cols).unwrap();
        table
            .set_filter("code", Some(FilterValue::from("T-0[12]")))
            .unwrap();
        assert_eq!(table.filtered_count(), 2);

        let err = table
            .set_filter("code", Some(FilterValue::from("T-[")))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
        assert_eq!(table.filtered_count(), 2);
    }

    #[test]
    fn test_selection_survives_hiding_filter() {
        let mut table = table();
        let id = RowId::from("T-02");
        assert!(table.toggle_selection(&id));

        table
            .set_filter("status", Some(FilterValue::from("A")))
            .unwrap();
        assert!(!codes(&table).contains(&"T-02".to_string()));
        assert!(table.is_selected(&id));
        assert_eq!(table.selected_records().len(), 1);
        assert_eq!(table.selected_records()[0].code, "T-02");

        table.set_filter("status", None).unwrap();
        let rows = table.derived_rows();
        let row = rows.iter().find(|r| r.id == id).unwrap();
        assert!(row.selected);
    }

    #[test]
    fn test_toggle_selection() {
        let mut table = table();
        let id = RowId::from("T-01");
        assert!(table.toggle_selection(&id));
        assert!(table.is_selected(&id));
        assert!(!table.toggle_selection(&id));
        assert!(!table.is_selected(&id));

        assert!(!table.toggle_selection(&RowId::from("T-99")));
        assert!(table.selected_ids().is_empty());
    }

    #[test]
    fn test_set_selection_ignores_unknown() {
        let mut table = table();
        table.set_selection(vec![RowId::from("T-04"), RowId::from("ghost")]);
        assert_eq!(table.selected_ids().len(), 1);
        assert!(table.is_selected(&RowId::from("T-04")));
    }

    #[test]
    fn test_select_all_filtered_spans_pages() {
        let mut table = table();
        table.set_page_size(1).unwrap();
        table
            .set_filter("status", Some(FilterValue::from("B")))
            .unwrap();
        table.select_all_filtered();
        assert_eq!(table.selected_ids().len(), 2);

        table.clear_selection();
        assert!(table.selected_ids().is_empty());
    }

    #[test]
    fn test_default_ids_are_source_indices() {
        let mut table = TableView::new(pallets(), columns()).unwrap();
        table.set_sort(vec![SortEntry::desc("code")]).unwrap();
        let rows = table.derived_rows();
        assert_eq!(rows[0].id, RowId::from(4usize));
        assert_eq!(table.row_id(0), Some(&RowId::from("0")));
    }

    #[test]
    fn test_visibility_only_affects_projection() {
        let mut table = table();
        table.set_column_visibility("weight", false).unwrap();
        assert!(!table.is_column_visible("weight"));
        assert!(!table.is_column_visible("nope"));

        table.set_sort(vec![SortEntry::asc("weight")]).unwrap();
        table
            .set_filter("weight", Some(FilterValue::range(Some(Value::Int(200)), None)))
            .unwrap();
        assert_eq!(codes(&table), vec!["T-04", "T-01", "T-02"]);

        let rows = table.derived_rows();
        let keys: Vec<&str> = rows[0].cells.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["code", "status", "product"]);
        assert!(rows[0].cell("weight").is_none());
        assert_eq!(rows[0].cell("status"), Some(&Value::from("C")));
    }

    #[test]
    fn test_hidden_by_default_column() {
        let mut cols = columns();
        cols.push(Column::new("notes", |_: &Pallet| Value::Null).hidden());
        let mut table = TableView::new(pallets(), cols).unwrap();
        assert_eq!(table.visible_columns().len(), 4);
        table.set_column_visibility("notes", true).unwrap();
        assert_eq!(table.visible_columns().len(), 5);
    }

    #[test]
    fn test_page_clamp_with_no_rows() {
        let mut table = table();
        table
            .set_filter("status", Some(FilterValue::from("Z")))
            .unwrap();
        table.set_page(5);
        assert_eq!(table.page_index(), 0);
        assert_eq!(table.page_count(), 0);
        assert!(table.derived_rows().is_empty());
    }

    #[test]
    fn test_page_navigation_and_clamp() {
        let mut table = table();
        table.set_page_size(2).unwrap();
        assert_eq!(table.page_count(), 3);

        table.set_page(99);
        assert_eq!(table.page_index(), 2);
        assert_eq!(codes(&table), vec!["T-05"]);
        assert!(!table.next_page());

        assert!(table.previous_page());
        assert_eq!(codes(&table), vec!["T-03", "T-04"]);
        assert!(table.previous_page());
        assert!(!table.previous_page());
        assert_eq!(table.page_index(), 0);
    }

    #[test]
    fn test_filter_clamps_page_without_resetting() {
        let mut table = table();
        table.set_page_size(2).unwrap();
        table.set_page(2);
        table
            .set_filter("status", Some(FilterValue::one_of(["A", "B"])))
            .unwrap();
        // 4 rows → 2 pages, page 2 clamps to 1
        assert_eq!(table.page_index(), 1);
        assert_eq!(codes(&table), vec!["T-03", "T-05"]);
    }

    #[test]
    fn test_set_page_size_rejects_zero() {
        let mut table = table();
        assert_eq!(
            table.set_page_size(0).unwrap_err(),
            ConfigurationError::InvalidPageSize(0)
        );
        assert_eq!(table.page_size(), 10);
    }

    #[test]
    fn test_dimensions_are_independent() {
        let mut table = table();
        table.set_sort(vec![SortEntry::asc("weight")]).unwrap();
        table
            .set_filter("product", Some(FilterValue::from("caja")))
            .unwrap();
        table.toggle_selection(&RowId::from("T-01"));
        table.set_column_visibility("product", false).unwrap();
        table.set_global_filter(Some("30x30".to_string()));

        let state = table.state();
        assert_eq!(state.sorting, vec![SortEntry::asc("weight")]);
        assert_eq!(state.filters.len(), 1);
        assert_eq!(state.selection.len(), 1);
        assert_eq!(state.visibility.get("product"), Some(&false));
        assert_eq!(state.global_filter.as_deref(), Some("30x30"));
        assert_eq!(codes(&table), vec!["T-04", "T-01"]);

        table.clear_filters();
        assert!(table.state().filters.is_empty());
        assert!(table.state().global_filter.is_none());
        assert_eq!(table.state().sorting.len(), 1);
        assert_eq!(table.state().selection.len(), 1);
    }

    #[test]
    fn test_global_filter_blank_clears() {
        let mut table = table();
        table.set_global_filter(Some("film".to_string()));
        assert_eq!(codes(&table), vec!["T-05"]);
        table.set_global_filter(Some("  ".to_string()));
        assert_eq!(table.filtered_count(), 5);
        assert!(table.state().global_filter.is_none());
    }

    #[test]
    fn test_set_records_prunes_selection() {
        let mut table = table();
        table.set_selection(vec![RowId::from("T-01"), RowId::from("T-05")]);
        table.set_sort(vec![SortEntry::desc("code")]).unwrap();

        let mut refreshed = pallets();
        refreshed.retain(|p| p.code != "T-05");
        refreshed.push(pallet("T-06", "A", "Film", Some(90.0)));
        table.set_records(refreshed);

        assert!(table.is_selected(&RowId::from("T-01")));
        assert!(!table.is_selected(&RowId::from("T-05")));
        assert_eq!(table.state().sorting, vec![SortEntry::desc("code")]);
        assert_eq!(all_codes(&table)[0], "T-06");
    }

    #[test]
    fn test_set_records_clears_positional_selection() {
        let mut table = TableView::new(pallets(), columns()).unwrap();
        table.set_selection([RowId::from(1usize)]);
        assert_eq!(
            table.selected_records().iter().map(|p| p.code.as_str()).collect::<Vec<_>>(),
            vec!["T-02"]
        );

        // T-01 is gone, so position 1 now holds T-03
        let mut refreshed = pallets();
        refreshed.remove(0);
        table.set_records(refreshed);

        assert!(table.selected_ids().is_empty());
        assert!(table.selected_records().is_empty());
        assert_eq!(table.row_id(1), Some(&RowId::from(1usize)));
    }

    #[test]
    fn test_null_filter_value_clears() {
        let mut table = table();
        table
            .set_filter("status", Some(FilterValue::from("A")))
            .unwrap();
        assert_eq!(table.filtered_count(), 2);

        table
            .set_filter("status", Some(FilterValue::Value(Value::Null)))
            .unwrap();
        assert_eq!(table.filtered_count(), 5);
        assert!(table.state().filters.is_empty());
    }

    #[test]
    fn test_null_filter_in_saved_state_is_dropped() {
        let state: TableState =
            serde_json::from_str(r#"{"filters": {"status": null, "product": "Film"}}"#).unwrap();
        let table = TableView::with_options(
            pallets(),
            columns(),
            TableOptions::new()
                .state(state)
                .row_id(|p: &Pallet| RowId::from(p.code.as_str())),
        )
        .unwrap();

        assert_eq!(all_codes(&table), vec!["T-05"]);
        assert!(!table.state().filters.contains_key("status"));
    }

    #[test]
    fn test_replacing_and_clearing_filters() {
        let mut table = table();
        table
            .set_filter("status", Some(FilterValue::from("A")))
            .unwrap();
        table
            .set_filter("status", Some(FilterValue::from("B")))
            .unwrap();
        assert_eq!(all_codes(&table), vec!["T-02", "T-05"]);

        table.set_filter("status", None).unwrap();
        assert_eq!(table.filtered_count(), 5);

        table
            .set_filter("product", Some(FilterValue::from("caja")))
            .unwrap();
        table.clear_filters();
        assert_eq!(table.filtered_count(), 5);
        assert!(table.state().filters.is_empty());
    }

    #[test]
    fn test_source_is_not_mutated() {
        let mut table = table();
        table.set_sort(vec![SortEntry::desc("weight")]).unwrap();
        table
            .set_filter("status", Some(FilterValue::from("A")))
            .unwrap();
        assert_eq!(table.records(), pallets().as_slice());
    }

    #[test]
    fn test_facets() {
        let table = table();
        let facets = table.facets("status").unwrap();
        assert_eq!(
            facets,
            vec![
                (Value::from("A"), 2),
                (Value::from("B"), 2),
                (Value::from("C"), 1)
            ]
        );
        let weights = table.facets("weight").unwrap();
        assert_eq!(weights.len(), 4);
        assert!(table.facets("nope").is_err());
    }

    #[test]
    fn test_row_serializes_without_record() {
        let table = table();
        let rows = table.derived_rows();
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["id"], "T-01");
        assert_eq!(json["index"], 0);
        assert_eq!(json["selected"], false);
        assert_eq!(json["cells"][0]["key"], "code");
        assert_eq!(json["cells"][0]["value"], "T-01");
        assert!(json.get("record").is_none());
    }
}
