//! Upload decoding: turns a roster file (delimited text or binary spreadsheet)
//! into an ordered column list plus raw rows.
//!
//! Real-world rosters rarely start with a clean header: exported workbooks
//! carry metadata rows, merged-cell debris, and internal names such as
//! `[Content_Types].xml`. The decoder locates the true header row with a
//! keyword scan, replaces unusable header cells with synthetic positional
//! names, and drops fully blank rows. Header-cell cleanup is driven by an
//! ordered rule table so each special case stays auditable on its own line.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};
use calamine::{Reader, open_workbook_auto};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::data::RosterFileRow;
use crate::io_utils;

/// Rows inspected when hunting for the header in a binary sheet.
const HEADER_SCAN_ROWS: usize = 10;

/// A row whose lower-cased concatenated text contains any of these tokens is
/// taken as the header.
const HEADER_KEYWORDS: &[&str] = &[
    "student",
    "name",
    "email",
    "phone",
    "department",
    "gender",
    "id",
];

/// Bracketed header content longer than this is workbook-internal metadata.
const BRACKET_SPAN_LIMIT: usize = 50;

/// One reason a header cell cannot be used as a column name. Rules are tried
/// in order; the first match wins and the cell gets a synthetic name.
struct HeaderRule {
    reason: &'static str,
    matches: fn(&str) -> bool,
}

/// Cleanup rules for headers read from a binary sheet.
const BINARY_HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        reason: "empty cell",
        matches: |cell| cell.is_empty(),
    },
    HeaderRule {
        reason: "angle brackets",
        matches: |cell| cell.contains('<') || cell.contains('>'),
    },
    HeaderRule {
        reason: "xml artifact",
        matches: |cell| cell.to_lowercase().contains("xml"),
    },
    HeaderRule {
        reason: "oversized bracketed content",
        matches: has_long_bracketed_span,
    },
];

/// Cleanup rules for headers parsed from delimited text. The bracket-length
/// rule is a binary-only quirk and deliberately absent here.
const TEXT_HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        reason: "empty cell",
        matches: |cell| cell.is_empty(),
    },
    HeaderRule {
        reason: "angle bracket",
        matches: |cell| cell.contains('<'),
    },
    HeaderRule {
        reason: "xml artifact",
        matches: |cell| cell.to_lowercase().contains("xml"),
    },
];

/// A successfully decoded upload: at least one column and one data row.
#[derive(Debug, Clone)]
pub struct DecodedRoster {
    /// Distinct column names in file order.
    pub columns: Vec<String>,
    /// Non-blank data rows in file order, each with a fresh opaque id.
    pub rows: Vec<RosterFileRow>,
}

/// Decodes `path`, sniffing the format from the file extension: `.xlsx` and
/// `.xls` take the binary spreadsheet path, everything else is parsed as
/// comma-delimited text in the given encoding.
pub fn decode_file(path: &Path, encoding: &'static Encoding) -> Result<DecodedRoster> {
    let roster = if has_spreadsheet_extension(path) {
        decode_workbook(path)?
    } else {
        let bytes = io_utils::read_file_bytes(path)?;
        let text = io_utils::decode_bytes(&bytes, encoding)
            .with_context(|| format!("Decoding roster text from {path:?}"))?;
        decode_delimited(&text)?
    };
    info!(
        "Decoded {} column(s) and {} row(s) from '{}'",
        roster.columns.len(),
        roster.rows.len(),
        path.display()
    );
    Ok(roster)
}

fn has_spreadsheet_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls")
    )
}

fn decode_workbook(path: &Path) -> Result<DecodedRoster> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening spreadsheet {path:?}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Spreadsheet {path:?} has no sheets"))?
        .with_context(|| format!("Reading first sheet of {path:?}"))?;

    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    decode_grid(grid)
}

/// Binary-path core, split out from the workbook read so the header heuristics
/// stay testable on plain string grids.
pub fn decode_grid(grid: Vec<Vec<String>>) -> Result<DecodedRoster> {
    ensure!(!grid.is_empty(), "Spreadsheet sheet contains no rows");

    let header_index = select_header_row(&grid);
    debug!("Header row selected at sheet index {header_index}");
    let columns = clean_headers(&grid[header_index], BINARY_HEADER_RULES);
    ensure!(
        !columns.is_empty(),
        "Spreadsheet header row contains no cells"
    );

    let rows = collect_rows(&columns, &grid[header_index + 1..]);
    ensure!(!rows.is_empty(), "No data rows found after the header row");

    Ok(DecodedRoster { columns, rows })
}

/// Text-path core: comma-delimited with double-quote escaping; cells are
/// unquoted and trimmed; blank lines are dropped.
pub fn decode_delimited(text: &str) -> Result<DecodedRoster> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b',')
        .double_quote(true)
        .flexible(true)
        .trim(csv::Trim::All);
    let mut reader = builder.from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.context("Parsing delimited roster text")?;
        let cells: Vec<String> = record.iter().map(|cell| cell.trim().to_string()).collect();
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        records.push(cells);
    }
    ensure!(!records.is_empty(), "Roster file contains no rows");

    let columns = clean_headers(&records[0], TEXT_HEADER_RULES);
    ensure!(!columns.is_empty(), "Roster header row contains no cells");

    let rows = collect_rows(&columns, &records[1..]);
    ensure!(!rows.is_empty(), "No data rows found after the header row");

    Ok(DecodedRoster { columns, rows })
}

/// Picks the header row among the first [`HEADER_SCAN_ROWS`] rows: the first
/// whose concatenated lower-cased text mentions a roster keyword wins, with
/// row 0 as the fallback.
fn select_header_row(grid: &[Vec<String>]) -> usize {
    grid.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| {
            let joined = row.join(" ").to_lowercase();
            HEADER_KEYWORDS.iter().any(|keyword| joined.contains(keyword))
        })
        .unwrap_or(0)
}

/// Applies the cleanup rule table to each header cell and guarantees the
/// resulting column names are distinct (repeats gain a numeric suffix).
fn clean_headers(header: &[String], rules: &[HeaderRule]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());
    for (index, raw) in header.iter().enumerate() {
        let cell = raw.trim();
        let name = match rules.iter().find(|rule| (rule.matches)(cell)) {
            Some(rule) => {
                debug!("Header cell {index} replaced ({}): {cell:?}", rule.reason);
                synthetic_column_name(index)
            }
            None => cell.to_string(),
        };
        let mut unique = name.clone();
        let mut suffix = 2;
        while !seen.insert(unique.clone()) {
            unique = format!("{name} ({suffix})");
            suffix += 1;
        }
        columns.push(unique);
    }
    columns
}

/// Positional fallback name: "Column A" through "Column Z", wrapping after 26.
fn synthetic_column_name(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    format!("Column {letter}")
}

fn has_long_bracketed_span(cell: &str) -> bool {
    let Some(open) = cell.find('[') else {
        return false;
    };
    let tail = &cell[open + 1..];
    match tail.find(']') {
        Some(close) => close > BRACKET_SPAN_LIMIT,
        None => tail.len() > BRACKET_SPAN_LIMIT,
    }
}

fn collect_rows(columns: &[String], data: &[Vec<String>]) -> Vec<RosterFileRow> {
    data.iter()
        .filter_map(|cells| {
            let mut mapped = BTreeMap::new();
            for (index, column) in columns.iter().enumerate() {
                if let Some(cell) = cells.get(index) {
                    mapped.insert(column.clone(), cell.trim().to_string());
                }
            }
            let row = RosterFileRow::new(mapped);
            if row.is_blank() { None } else { Some(row) }
        })
        .collect()
}
