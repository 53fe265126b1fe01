//! Template function registry
//!
//! Function-call expressions dispatch through a fixed capability map built
//! once at initialization. The registry is enumerable for testing, and an
//! unregistered name fails the call explicitly rather than passing the
//! expression through unresolved. All functions are pure reads: they open,
//! query, and close their source within the call and never execute
//! arbitrary code.

pub mod csv;
pub mod json_path;
pub mod sqlite;
pub mod structured;
pub mod text;

use crate::error::{ResolveError, ResolveResult};
use std::collections::HashMap;
use std::path::Path;

/// A template function: receives the invoked name (several names can share
/// an implementation) and the split argument list.
pub type FunctionHandler = fn(&str, &[String]) -> ResolveResult<String>;

/// Capability map from function name to handler
pub struct FunctionRegistry {
    handlers: HashMap<&'static str, FunctionHandler>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FunctionRegistry {
    /// An empty registry, for tests that register their own handlers
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The standard function set over text, CSV, SQLite, and YAML/JSON
    /// sources
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        registry.register("file_line", text::file_line);
        registry.register("file_word", text::file_word);
        registry.register("line_count", text::line_count);
        registry.register("word_count", text::word_count);

        registry.register("csv_cell", csv::csv_cell);
        registry.register("csv_row", csv::csv_row);
        registry.register("csv_column", csv::csv_column);
        registry.register("csv_value", csv::csv_value);

        registry.register("sqlite_query", sqlite::sqlite_query);
        registry.register("sqlite_value", sqlite::sqlite_value);

        // YAML is a superset of JSON, so both prefixes share one
        // implementation per operation.
        registry.register("yaml_path", structured::path_query);
        registry.register("json_path", structured::path_query);
        registry.register("yaml_value", structured::dotted_value);
        registry.register("json_value", structured::dotted_value);
        registry.register("yaml_count", structured::count);
        registry.register("json_count", structured::count);
        registry.register("yaml_keys", structured::keys);
        registry.register("json_keys", structured::keys);
        registry.register("yaml_collect", structured::collect);
        registry.register("json_collect", structured::collect);
        registry.register("yaml_sum", structured::sum);
        registry.register("json_sum", structured::sum);
        registry.register("yaml_avg", structured::avg);
        registry.register("json_avg", structured::avg);
        registry.register("yaml_max", structured::max);
        registry.register("json_max", structured::max);
        registry.register("yaml_min", structured::min);
        registry.register("json_min", structured::min);
        registry.register("yaml_filter", structured::collect);
        registry.register("json_filter", structured::collect);
        registry.register("yaml_count_where", structured::count);
        registry.register("json_count_where", structured::count);

        registry
    }

    /// Add or replace a handler
    pub fn register(&mut self, name: &'static str, handler: FunctionHandler) {
        self.handlers.insert(name, handler);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch a call by name
    pub fn call(&self, name: &str, args: &[String]) -> ResolveResult<String> {
        match self.handlers.get(name) {
            Some(handler) => handler(name, args),
            None => Err(ResolveError::UnknownFunction {
                name: name.to_string(),
                available: self.names().iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

/// Reject a call whose argument count does not match the function's arity.
pub(crate) fn expect_args(name: &str, args: &[String], expected: usize) -> ResolveResult<()> {
    if args.len() != expected {
        return Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("expected {expected} arguments, got {}", args.len()),
        });
    }
    Ok(())
}

/// Parse a non-negative index argument.
pub(crate) fn parse_index(name: &str, raw: &str, what: &str) -> ResolveResult<usize> {
    raw.trim().parse().map_err(|_| ResolveError::Argument {
        function: name.to_string(),
        reason: format!("{what} must be a non-negative integer, got '{raw}'"),
    })
}

/// Read a source file, distinguishing a missing file from any other
/// failure mode.
pub(crate) fn read_source(name: &str, path: &str) -> ResolveResult<String> {
    if !Path::new(path).exists() {
        return Err(ResolveError::SourceNotFound {
            function: name.to_string(),
            missing: path.to_string(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ResolveError::SourceNotFound {
        function: name.to_string(),
        missing: format!("{path} ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_enumerable() {
        let registry = FunctionRegistry::standard();
        let names = registry.names();

        for expected in [
            "file_line",
            "file_word",
            "line_count",
            "word_count",
            "csv_cell",
            "csv_row",
            "csv_column",
            "csv_value",
            "sqlite_query",
            "sqlite_value",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        // Every yaml_* operation has a json_* twin.
        for name in &names {
            if let Some(op) = name.strip_prefix("yaml_") {
                let twin = format!("json_{op}");
                assert!(names.iter().any(|n| *n == twin), "no twin for {name}");
            }
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let registry = FunctionRegistry::standard();
        let err = registry.call("unknown_function", &[]).unwrap_err();
        assert_eq!(err.kind(), "unknown_function");
        assert!(err.to_string().contains("unknown_function"));
    }

    #[test]
    fn test_custom_registration() {
        fn shout(_name: &str, args: &[String]) -> crate::error::ResolveResult<String> {
            Ok(args.join("-").to_uppercase())
        }

        let mut registry = FunctionRegistry::empty();
        registry.register("shout", shout);
        let result = registry
            .call("shout", &["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(result, "A-B");
    }

    #[test]
    fn test_expect_args_mismatch() {
        let err = expect_args("file_line", &["1".to_string()], 2).unwrap_err();
        assert_eq!(err.kind(), "argument");
    }

    #[test]
    fn test_parse_index_rejects_garbage() {
        let err = parse_index("file_line", "not_a_number", "line number").unwrap_err();
        assert_eq!(err.kind(), "argument");
        assert!(err.to_string().contains("not_a_number"));
    }
}
