//! Function library fixtures, driven through registry dispatch
//!
//! Exercises every function family against real sandbox files, the same
//! way the engine dispatches them.

use anyhow::Result;
use crucible::FunctionRegistry;
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    text: String,
    csv: String,
    db: String,
    yaml: String,
}

fn sandbox() -> Result<Sandbox> {
    let dir = TempDir::new()?;

    let text = dir.path().join("lines.txt");
    fs::write(&text, "A\nB\nC\nD\nE\n")?;

    let csv = dir.path().join("people.csv");
    fs::write(&csv, "name,age\nJohn,25\nAlice,30\n")?;

    let db = dir.path().join("store.db");
    let conn = Connection::open(&db)?;
    conn.execute_batch(
        "CREATE TABLE orders (customer TEXT, total REAL);
         INSERT INTO orders VALUES ('John', 19.5);
         INSERT INTO orders VALUES ('Alice', 42.0);",
    )?;

    let yaml = dir.path().join("report.yml");
    fs::write(
        &yaml,
        "quarter: Q3\nregions:\n  - name: west\n    revenue: 120\n  - name: east\n    revenue: 80\n",
    )?;

    Ok(Sandbox {
        text: text.to_string_lossy().into_owned(),
        csv: csv.to_string_lossy().into_owned(),
        db: db.to_string_lossy().into_owned(),
        yaml: yaml.to_string_lossy().into_owned(),
        _dir: dir,
    })
}

fn call(registry: &FunctionRegistry, name: &str, args: &[&str]) -> crucible::ResolveResult<String> {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    registry.call(name, &args)
}

#[test]
fn test_text_family() -> Result<()> {
    let sandbox = sandbox()?;
    let registry = FunctionRegistry::standard();

    assert_eq!(call(&registry, "file_line", &["3", &sandbox.text])?, "C");
    assert_eq!(call(&registry, "file_word", &["5", &sandbox.text])?, "E");
    assert_eq!(call(&registry, "line_count", &[&sandbox.text])?, "5");
    assert_eq!(call(&registry, "word_count", &[&sandbox.text])?, "5");
    Ok(())
}

#[test]
fn test_csv_family() -> Result<()> {
    let sandbox = sandbox()?;
    let registry = FunctionRegistry::standard();

    assert_eq!(
        call(&registry, "csv_value", &["0", "name", &sandbox.csv])?,
        "John"
    );
    assert_eq!(call(&registry, "csv_cell", &["1", "1", &sandbox.csv])?, "30");
    assert_eq!(
        call(&registry, "csv_row", &["1", &sandbox.csv])?,
        "Alice, 30"
    );
    assert_eq!(
        call(&registry, "csv_column", &["name", &sandbox.csv])?,
        "John, Alice"
    );
    Ok(())
}

#[test]
fn test_sqlite_family() -> Result<()> {
    let sandbox = sandbox()?;
    let registry = FunctionRegistry::standard();

    assert_eq!(
        call(
            &registry,
            "sqlite_query",
            &["SELECT COUNT(*) FROM orders", &sandbox.db]
        )?,
        "2"
    );
    assert_eq!(
        call(
            &registry,
            "sqlite_query",
            &["SELECT SUM(total) FROM orders", &sandbox.db]
        )?,
        "61.5"
    );
    assert_eq!(
        call(
            &registry,
            "sqlite_value",
            &["1", "customer", "orders", &sandbox.db]
        )?,
        "Alice"
    );
    Ok(())
}

#[test]
fn test_structured_family() -> Result<()> {
    let sandbox = sandbox()?;
    let registry = FunctionRegistry::standard();

    assert_eq!(
        call(&registry, "yaml_value", &["quarter", &sandbox.yaml])?,
        "Q3"
    );
    assert_eq!(
        call(&registry, "yaml_path", &["$.regions[*].name", &sandbox.yaml])?,
        "west, east"
    );
    assert_eq!(call(&registry, "yaml_count", &["regions", &sandbox.yaml])?, "2");
    assert_eq!(
        call(&registry, "yaml_sum", &["$.regions[*].revenue", &sandbox.yaml])?,
        "200"
    );
    assert_eq!(
        call(&registry, "yaml_avg", &["$.regions[*].revenue", &sandbox.yaml])?,
        "100"
    );
    assert_eq!(
        call(
            &registry,
            "yaml_filter",
            &["$.regions[?revenue>100].name", &sandbox.yaml]
        )?,
        "west"
    );
    assert_eq!(
        call(
            &registry,
            "yaml_count_where",
            &["$.regions[?revenue>=80]", &sandbox.yaml]
        )?,
        "2"
    );
    // json_* twins run the same implementations.
    assert_eq!(
        call(&registry, "json_value", &["quarter", &sandbox.yaml])?,
        "Q3"
    );
    Ok(())
}

#[test]
fn test_error_kinds_distinguish_missing_source_from_missing_data() -> Result<()> {
    let sandbox = sandbox()?;
    let registry = FunctionRegistry::standard();

    let missing_file = call(&registry, "file_line", &["1", "/no/such/file.txt"]).unwrap_err();
    assert_eq!(missing_file.kind(), "source_not_found");

    let missing_line = call(&registry, "file_line", &["999", &sandbox.text]).unwrap_err();
    assert_eq!(missing_line.kind(), "not_found");

    let missing_column = call(&registry, "csv_value", &["0", "salary", &sandbox.csv]).unwrap_err();
    assert_eq!(missing_column.kind(), "not_found");

    let missing_table =
        call(&registry, "sqlite_value", &["0", "customer", "refunds", &sandbox.db]).unwrap_err();
    assert_eq!(missing_table.kind(), "source_not_found");

    let bad_argument = call(&registry, "file_line", &["one", &sandbox.text]).unwrap_err();
    assert_eq!(bad_argument.kind(), "argument");
    Ok(())
}
