//! Cell, row, and column lookups over CSV sources
//!
//! The header row is excluded from row numbering: row 0 is the first data
//! row. Column lookups go by header name; positional cell access uses a
//! 0-based column index.

use super::{expect_args, parse_index};
use crate::error::{ResolveError, ResolveResult};
use csv::StringRecord;
use std::path::Path;

/// `csv_cell:row:col:path` — positional cell access
pub fn csv_cell(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 3)?;
    let row = parse_index(name, &args[0], "row index")?;
    let col = parse_index(name, &args[1], "column index")?;
    let (_, rows) = load(name, &args[2])?;
    let record = data_row(name, &rows, row, &args[2])?;
    record
        .get(col)
        .map(|cell| cell.to_string())
        .ok_or_else(|| ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("column {col}"),
            container: format!("{} ({} columns)", args[2], record.len()),
        })
}

/// `csv_row:N:path` — a whole data row, comma-joined
pub fn csv_row(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 2)?;
    let row = parse_index(name, &args[0], "row index")?;
    let (_, rows) = load(name, &args[1])?;
    let record = data_row(name, &rows, row, &args[1])?;
    Ok(record.iter().collect::<Vec<_>>().join(", "))
}

/// `csv_column:header:path` — every value under a header, comma-joined
pub fn csv_column(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 2)?;
    let (headers, rows) = load(name, &args[1])?;
    let col = header_index(name, &headers, &args[0], &args[1])?;
    let values: Vec<&str> = rows
        .iter()
        .map(|record| record.get(col).unwrap_or(""))
        .collect();
    Ok(values.join(", "))
}

/// `csv_value:row:header:path` — one cell addressed by row and header name
pub fn csv_value(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 3)?;
    let row = parse_index(name, &args[0], "row index")?;
    let (headers, rows) = load(name, &args[2])?;
    let col = header_index(name, &headers, &args[1], &args[2])?;
    let record = data_row(name, &rows, row, &args[2])?;
    Ok(record.get(col).unwrap_or("").to_string())
}

fn load(name: &str, path: &str) -> ResolveResult<(StringRecord, Vec<StringRecord>)> {
    if !Path::new(path).exists() {
        return Err(ResolveError::SourceNotFound {
            function: name.to_string(),
            missing: path.to_string(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| malformed(name, path, e))?;
    let headers = reader.headers().map_err(|e| malformed(name, path, e))?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|e| malformed(name, path, e))?);
    }
    Ok((headers, rows))
}

fn malformed(name: &str, path: &str, error: csv::Error) -> ResolveError {
    ResolveError::Argument {
        function: name.to_string(),
        reason: format!("malformed CSV {path}: {error}"),
    }
}

fn header_index(
    name: &str,
    headers: &StringRecord,
    header: &str,
    path: &str,
) -> ResolveResult<usize> {
    headers
        .iter()
        .position(|h| h == header)
        .ok_or_else(|| ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("column '{header}'"),
            container: format!(
                "{path} (headers: {})",
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        })
}

fn data_row<'r>(
    name: &str,
    rows: &'r [StringRecord],
    row: usize,
    path: &str,
) -> ResolveResult<&'r StringRecord> {
    rows.get(row).ok_or_else(|| ResolveError::NotFound {
        function: name.to_string(),
        missing: format!("row {row}"),
        container: format!("{path} ({} data rows)", rows.len()),
    })
}
