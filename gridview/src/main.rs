//! # gridview
//!
//! A CLI for browsing JSON records as a table: sort, filter, search, select
//! and page through them from the shell.
//!
//! ## Overview
//!
//! gridview is built on top of gridviewlib. It reads a JSON array of
//! records, builds columns from an optional view file (or from the first
//! record's keys), applies the state given on the command line and prints
//! the current page.
//!
//! ## Usage
//!
//! ```bash
//! # Show the first page, columns inferred from the records
//! gridview pallets.json
//!
//! # Sort by weight descending, then code
//! gridview pallets.json --sort weight:desc,code
//!
//! # Filter (repeatable, combined with AND) and search across columns
//! gridview pallets.json --filter status=A --filter weight=100..500 --search norte
//!
//! # Columns, ids and defaults from a view file, third page of 20
//! gridview pallets.json --view pallets.view.json --page-size 20 --page 3
//!
//! # Select rows by id and keep the resulting state for the next run
//! gridview pallets.json --id-field code --select T-02 --save-state state.json
//! gridview pallets.json --id-field code --state state.json --output json
//!
//! # Distinct values of a column with counts
//! gridview pallets.json --facets status
//! ```
//!
//! Set `GRIDVIEW_LOG` (e.g. `GRIDVIEW_LOG=debug`) to log to stderr.

mod config;
mod render;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use gridviewlib::{
    GridRow, GridTable, RowId, SortEntry, TableOptions, TableState, TableView, Value,
};
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{load_records, parse_filter_value, row_id_for, ViewConfig};

/// Environment variable holding the log filter
const LOG_ENV: &str = "GRIDVIEW_LOG";

/// JSON output: the page snapshot plus the state that produced it
#[derive(Debug, Serialize)]
struct PageOutput<'a> {
    #[serde(flatten)]
    table: GridTable,
    page_count: usize,
    filtered: usize,
    total: usize,
    state: &'a TableState,
}

/// One facet entry for JSON output
#[derive(Debug, Serialize)]
struct FacetOutput {
    value: Value,
    count: usize,
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("gridview")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Sort, filter, select and page through JSON records as a table")
        .arg(
            Arg::new("records")
                .required(true)
                .help("JSON file holding an array of records ('-' reads stdin)"),
        )
        .arg(
            Arg::new("view")
                .long("view")
                .help("View file with columns, id field and defaults"),
        )
        .arg(
            Arg::new("state")
                .long("state")
                .help("Start from a table state saved with --save-state"),
        )
        .arg(
            Arg::new("save-state")
                .long("save-state")
                .help("Write the resulting table state to a file"),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_delimiter(',')
                .help("Sort keys in priority order (comma-separated: key[:asc|desc])"),
        )
        .arg(
            Arg::new("filter")
                .short('f')
                .long("filter")
                .action(ArgAction::Append)
                .help("Column filter key=value (can be specified multiple times; empty value clears)"),
        )
        .arg(
            Arg::new("search")
                .short('q')
                .long("search")
                .help("Case-insensitive search across filterable columns"),
        )
        .arg(
            Arg::new("hide")
                .long("hide")
                .action(ArgAction::Append)
                .help("Hide a column (can be specified multiple times)"),
        )
        .arg(
            Arg::new("show")
                .long("show")
                .action(ArgAction::Append)
                .help("Show a column hidden by default (can be specified multiple times)"),
        )
        .arg(
            Arg::new("id-field")
                .long("id-field")
                .help("Record field identifying rows (defaults to position)"),
        )
        .arg(
            Arg::new("select")
                .long("select")
                .action(ArgAction::Append)
                .help("Select a row by id (can be specified multiple times)"),
        )
        .arg(
            Arg::new("select-all")
                .long("select-all")
                .action(ArgAction::SetTrue)
                .help("Select every row matching the filters"),
        )
        .arg(
            Arg::new("page")
                .short('p')
                .long("page")
                .value_parser(clap::value_parser!(usize))
                .help("Page number, starting at 1 (clamped to the last page)"),
        )
        .arg(
            Arg::new("page-size")
                .short('n')
                .long("page-size")
                .value_parser(clap::value_parser!(usize))
                .help("Rows per page"),
        )
        .arg(
            Arg::new("title")
                .long("title")
                .help("Title printed above the table"),
        )
        .arg(
            Arg::new("facets")
                .long("facets")
                .help("List distinct values of a column with their counts"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["table", "json"])
                .default_value("table")
                .help("Output format"),
        )
}

/// Collect repeated string arguments
fn strings<'a>(matches: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    matches
        .get_many::<String>(id)
        .map(|v| v.map(|s| s.as_str()).collect())
        .unwrap_or_default()
}

/// Build the table from records, view file and saved state
fn build_table(matches: &ArgMatches, config: &ViewConfig) -> anyhow::Result<TableView<Json>> {
    let path = matches
        .get_one::<String>("records")
        .map(|s| s.as_str())
        .unwrap_or("-");
    let records = load_records(path)?;
    debug!(records = records.len(), path, "loaded records");

    let columns = config.columns(&records);
    let state = match matches.get_one::<String>("state") {
        Some(state_path) => {
            let text = std::fs::read_to_string(state_path)
                .with_context(|| format!("failed to read state file '{}'", state_path))?;
            serde_json::from_str::<TableState>(&text)
                .with_context(|| format!("invalid state file '{}'", state_path))?
        }
        None => config.initial_state(),
    };

    let mut options = TableOptions::new().state(state);
    let id_field = matches
        .get_one::<String>("id-field")
        .cloned()
        .or_else(|| config.id_field.clone());
    if let Some(field) = id_field {
        options = options.row_id(row_id_for(field));
    }

    Ok(TableView::with_options(records, columns, options)?)
}

/// Apply command-line state on top of the initial state
fn apply_arguments(
    table: &mut TableView<Json>,
    matches: &ArgMatches,
    config: &ViewConfig,
) -> anyhow::Result<()> {
    let sort = strings(matches, "sort");
    if !sort.is_empty() {
        let entries = sort
            .iter()
            .map(|s| s.parse::<SortEntry>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(anyhow::Error::msg)?;
        table.set_sort(entries)?;
    }

    for spec in strings(matches, "filter") {
        let Some((key, raw)) = spec.split_once('=') else {
            bail!("invalid filter '{}': expected key=value", spec);
        };
        let value = if raw.is_empty() {
            None
        } else {
            Some(parse_filter_value(raw, config.filter_kind(key)))
        };
        table.set_filter(key, value)?;
    }

    if let Some(search) = matches.get_one::<String>("search") {
        table.set_global_filter(Some(search.clone()));
    }

    for key in strings(matches, "hide") {
        table.set_column_visibility(key, false)?;
    }
    for key in strings(matches, "show") {
        table.set_column_visibility(key, true)?;
    }

    let selection = strings(matches, "select");
    if !selection.is_empty() {
        table.set_selection(selection.into_iter().map(RowId::from));
    }
    if matches.get_flag("select-all") {
        table.select_all_filtered();
    }

    if let Some(&size) = matches.get_one::<usize>("page-size") {
        table.set_page_size(size)?;
    }
    if let Some(&page) = matches.get_one::<usize>("page") {
        table.set_page(page.saturating_sub(1));
    }

    info!(
        filtered = table.filtered_count(),
        total = table.total_count(),
        page = table.page_index(),
        "view ready"
    );
    Ok(())
}

/// Facets of a column as a two-column table
fn facet_table(key: &str, facets: &[(Value, usize)]) -> GridTable {
    GridTable {
        title: None,
        headers: vec![key.to_string(), "Count".to_string()],
        rows: facets
            .iter()
            .map(|(value, count)| GridRow {
                id: value.to_string(),
                selected: false,
                values: vec![value.to_string(), count.to_string()],
            })
            .collect(),
        footer: format!("{} distinct values", facets.len()),
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    let config = match matches.get_one::<String>("view") {
        Some(path) => ViewConfig::load(Path::new(path))?,
        None => ViewConfig::default(),
    };

    let mut table = build_table(matches, &config)?;
    apply_arguments(&mut table, matches, &config)?;

    if let Some(path) = matches.get_one::<String>("save-state") {
        let text = serde_json::to_string_pretty(table.state())?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write state file '{}'", path))?;
        debug!(path = path.as_str(), "saved table state");
    }

    let json = matches
        .get_one::<String>("output")
        .is_some_and(|o| o == "json");

    if let Some(key) = matches.get_one::<String>("facets") {
        let facets = table.facets(key)?;
        if json {
            let entries: Vec<FacetOutput> = facets
                .into_iter()
                .map(|(value, count)| FacetOutput { value, count })
                .collect();
            return Ok(serde_json::to_string_pretty(&entries)?);
        }
        return render::render_table(&facet_table(key, &facets));
    }

    let mut snapshot = GridTable::from_view(&table);
    if let Some(title) = matches.get_one::<String>("title").or(config.title.as_ref()) {
        snapshot = snapshot.with_title(title.clone());
    }

    if json {
        let output = PageOutput {
            table: snapshot,
            page_count: table.page_count(),
            filtered: table.filtered_count(),
            total: table.total_count(),
            state: table.state(),
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }
    render::render_table(&snapshot)
}

/// Log to stderr, filtered by GRIDVIEW_LOG (warnings only by default)
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let matches = build_command().get_matches();

    match run(&matches) {
        Ok(output) => {
            if output.ends_with('\n') {
                print!("{}", output);
            } else {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
