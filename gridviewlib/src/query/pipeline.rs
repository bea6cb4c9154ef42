//! Row derivation: filter and sort records into a view order.
//!
//! The pipeline is a pure function of the records, the columns and the
//! table state. It returns indices into the source collection rather than
//! records, so the source is never reordered or copied:
//!
//! 1. Filter: every active column filter AND the global search must pass
//! 2. Sort: stable multi-key sort; full ties keep source order
//!
//! Pagination is a slice of the result and is applied by the caller.

use std::cmp::Ordering;
use std::ops::Range;

use crate::data::{Column, Value};
use crate::error::ConfigurationError;
use crate::query::matcher::{contains_ignore_case, Matcher};
use crate::query::options::{FilterValue, SortDirection, SortEntry, TableState};
use crate::Result;

/// Column filters compiled once: column position and matcher.
pub type CompiledFilters = Vec<(usize, Matcher)>;

/// Compute the filtered and sorted source indices for a table.
///
/// The state is validated against the columns first: unknown, non-sortable
/// or non-filterable keys and bad glob patterns are errors. Null filter
/// values are treated as absent.
pub fn derive_indices<T>(
    records: &[T],
    columns: &[Column<T>],
    state: &TableState,
) -> Result<Vec<usize>> {
    validate_sorting(columns, &state.sorting)?;
    let filters = compile_filters(columns, state)?;
    Ok(derive_with_filters(records, columns, &filters, state))
}

/// Like [`derive_indices`], with filters compiled ahead of time.
pub fn derive_with_filters<T>(
    records: &[T],
    columns: &[Column<T>],
    filters: &[(usize, Matcher)],
    state: &TableState,
) -> Vec<usize> {
    let filtered = filter_indices(records, columns, filters, state.global_filter.as_deref());
    sort_indices(records, columns, &state.sorting, filtered)
}

/// Compile every non-null filter of a state.
pub fn compile_filters<T>(columns: &[Column<T>], state: &TableState) -> Result<CompiledFilters> {
    state
        .filters
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| compile_filter(columns, key, value))
        .collect()
}

/// Compile one filter for the column named `key`.
pub fn compile_filter<T>(
    columns: &[Column<T>],
    key: &str,
    value: &FilterValue,
) -> Result<(usize, Matcher)> {
    let position = filterable_position(columns, key)?;
    Ok((position, Matcher::compile(&columns[position], value)?))
}

/// Position of a filterable column.
pub fn filterable_position<T>(columns: &[Column<T>], key: &str) -> Result<usize> {
    let position = column_position(columns, key)?;
    if !columns[position].is_filterable() {
        return Err(ConfigurationError::NotFilterable(key.to_string()));
    }
    Ok(position)
}

/// Check that every sort entry names a sortable column.
pub fn validate_sorting<T>(columns: &[Column<T>], sorting: &[SortEntry]) -> Result<()> {
    for entry in sorting {
        let position = column_position(columns, &entry.key)?;
        if !columns[position].is_sortable() {
            return Err(ConfigurationError::NotSortable(entry.key.clone()));
        }
    }
    Ok(())
}

/// Position of a column by key.
pub fn column_position<T>(columns: &[Column<T>], key: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.key() == key)
        .ok_or_else(|| ConfigurationError::UnknownColumn(key.to_string()))
}

/// Source indices of records passing every filter, in source order.
///
/// A blank `global_filter` is ignored; otherwise it must appear
/// (case-insensitively) in at least one filterable column.
pub fn filter_indices<T>(
    records: &[T],
    columns: &[Column<T>],
    filters: &[(usize, Matcher)],
    global_filter: Option<&str>,
) -> Vec<usize> {
    let needle = global_filter
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let searchable: Vec<&Column<T>> = columns.iter().filter(|c| c.is_filterable()).collect();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            filters
                .iter()
                .all(|(position, matcher)| matcher.matches(&columns[*position].value(record)))
        })
        .filter(|(_, record)| match &needle {
            None => true,
            Some(needle) => searchable
                .iter()
                .any(|column| contains_ignore_case(&column.value(record), needle)),
        })
        .map(|(i, _)| i)
        .collect()
}

/// Stable sort of `indices` by a sort specification.
///
/// Entries naming unknown columns are skipped; see [`validate_sorting`].
pub fn sort_indices<T>(
    records: &[T],
    columns: &[Column<T>],
    sorting: &[SortEntry],
    indices: Vec<usize>,
) -> Vec<usize> {
    let keys: Vec<(&Column<T>, SortDirection)> = sorting
        .iter()
        .filter_map(|entry| {
            columns
                .iter()
                .find(|c| c.key() == entry.key)
                .map(|c| (c, entry.direction))
        })
        .collect();

    if keys.is_empty() {
        return indices;
    }

    // Extract each sort value once; columns with a comparator read records directly.
    let mut decorated: Vec<(usize, Vec<Value>)> = indices
        .into_iter()
        .map(|i| {
            let values = keys
                .iter()
                .map(|(column, _)| match column.comparator() {
                    Some(_) => Value::Null,
                    None => column.value(&records[i]),
                })
                .collect();
            (i, values)
        })
        .collect();

    decorated.sort_by(|(ia, va), (ib, vb)| {
        for (pos, (column, direction)) in keys.iter().enumerate() {
            let ordering = match column.comparator() {
                Some(cmp) => direction.apply(cmp(&records[*ia], &records[*ib])),
                None => compare_nulls_last(&va[pos], &vb[pos], *direction),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    decorated.into_iter().map(|(i, _)| i).collect()
}

/// Compare two values in the given direction, with nulls always last.
pub fn compare_nulls_last(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => direction.apply(a.compare(b)),
    }
}

/// Index range of one page within `len` derived rows.
pub fn page_range(len: usize, page_index: usize, page_size: usize) -> Range<usize> {
    let start = page_index.saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}
