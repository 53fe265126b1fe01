//! Scalar queries over SQLite sources
//!
//! Databases are opened read-only and closed before the call returns.
//! `sqlite_query` runs caller-authored SQL but requires a single-scalar
//! result: aggregation belongs in the SQL itself. `sqlite_value` addresses
//! one cell by row, column, and table with validated identifiers.

use super::{expect_args, parse_index};
use crate::error::{ResolveError, ResolveResult};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// `sqlite_query:SQL:path` — run a query that yields exactly one scalar
pub fn sqlite_query(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 2)?;
    let sql = &args[0];
    let conn = open(name, &args[1])?;
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| query_error(name, sql, &args[1], e))?;

    let columns = stmt.column_count();
    if columns != 1 {
        return Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("query must select exactly one column, got {columns}"),
        });
    }

    let mut rows = stmt
        .query([])
        .map_err(|e| query_error(name, sql, &args[1], e))?;
    let value = {
        let row = rows
            .next()
            .map_err(|e| query_error(name, sql, &args[1], e))?
            .ok_or_else(|| ResolveError::NotFound {
                function: name.to_string(),
                missing: "any row".to_string(),
                container: format!("query '{sql}' against {}", args[1]),
            })?;
        render(name, row.get_ref(0).map_err(|e| query_error(name, sql, &args[1], e))?)?
    };
    if rows
        .next()
        .map_err(|e| query_error(name, sql, &args[1], e))?
        .is_some()
    {
        return Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("query '{sql}' returned more than one row; aggregate in SQL instead"),
        });
    }

    Ok(value)
}

/// `sqlite_value:row:column:table:path` — one cell, row 0 is the first row
/// of the table in its natural order
pub fn sqlite_value(name: &str, args: &[String]) -> ResolveResult<String> {
    expect_args(name, args, 4)?;
    let row = parse_index(name, &args[0], "row index")?;
    let column = identifier(name, &args[1], "column")?;
    let table = identifier(name, &args[2], "table")?;
    let conn = open(name, &args[3])?;

    let sql = format!("SELECT \"{column}\" FROM \"{table}\" LIMIT 1 OFFSET {row}");
    let mut stmt = conn.prepare(&sql).map_err(|e| {
        let text = e.to_string();
        if text.contains("no such table") {
            ResolveError::SourceNotFound {
                function: name.to_string(),
                missing: format!("table '{table}' in {}", args[3]),
            }
        } else if text.contains("no such column") {
            ResolveError::NotFound {
                function: name.to_string(),
                missing: format!("column '{column}'"),
                container: format!("table '{table}' in {}", args[3]),
            }
        } else {
            ResolveError::Argument {
                function: name.to_string(),
                reason: format!("lookup failed: {text}"),
            }
        }
    })?;

    let mut rows = stmt
        .query([])
        .map_err(|e| query_error(name, &sql, &args[3], e))?;
    let row_ref = rows
        .next()
        .map_err(|e| query_error(name, &sql, &args[3], e))?
        .ok_or_else(|| ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("row {row}"),
            container: format!("table '{table}' in {}", args[3]),
        })?;
    render(
        name,
        row_ref
            .get_ref(0)
            .map_err(|e| query_error(name, &sql, &args[3], e))?,
    )
}

fn open(name: &str, path: &str) -> ResolveResult<Connection> {
    if !Path::new(path).exists() {
        return Err(ResolveError::SourceNotFound {
            function: name.to_string(),
            missing: path.to_string(),
        });
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
        ResolveError::Argument {
            function: name.to_string(),
            reason: format!("failed to open database {path}: {e}"),
        }
    })
}

fn query_error(name: &str, sql: &str, path: &str, error: rusqlite::Error) -> ResolveError {
    let text = error.to_string();
    if text.contains("no such table") {
        ResolveError::SourceNotFound {
            function: name.to_string(),
            missing: format!("table referenced by '{sql}' in {path}"),
        }
    } else {
        ResolveError::Argument {
            function: name.to_string(),
            reason: format!("query '{sql}' failed: {text}"),
        }
    }
}

/// Identifiers are interpolated into SQL, so restrict them to plain
/// word characters.
fn identifier<'a>(name: &str, raw: &'a str, what: &str) -> ResolveResult<&'a str> {
    let valid = !raw.is_empty()
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !raw.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("invalid {what} identifier '{raw}'"),
        });
    }
    Ok(raw)
}

fn render(name: &str, value: ValueRef<'_>) -> ResolveResult<String> {
    match value {
        ValueRef::Null => Ok(String::new()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(r) => Ok(r.to_string()),
        ValueRef::Text(t) => Ok(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Err(ResolveError::Argument {
            function: name.to_string(),
            reason: "binary values cannot be rendered as an answer".to_string(),
        }),
    }
}
