//! Query and aggregation functions over YAML and JSON documents
//!
//! One loader serves both families: YAML is a superset of JSON, so a
//! `.json` sandbox artifact parses through the same path as a `.yml` one.
//! Multi-value selections render as comma-joined lists, matching how an
//! expected answer would be written in prose.

use super::json_path::PathExpr;
use super::{expect_args, read_source};
use crate::error::{ResolveError, ResolveResult};
use serde_json::Value;

/// `yaml_path:expr:path` / `json_path:expr:path` — values at a path
/// expression; multiple matches join with `, `
pub fn path_query(name: &str, args: &[String]) -> ResolveResult<String> {
    let values = select(name, args)?;
    Ok(join(&values))
}

/// `yaml_value:dotted.key:path` — a single value at a dotted key
pub fn dotted_value(name: &str, args: &[String]) -> ResolveResult<String> {
    let values = select(name, args)?;
    if values.len() > 1 {
        return Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("'{}' matched {} values, expected one", args[0], values.len()),
        });
    }
    match values.first() {
        Some(value) => Ok(render(value)),
        None => Err(ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("value at '{}'", args[0]),
            container: args[1].clone(),
        }),
    }
}

/// `yaml_count:expr:path` — element count of the selection; a single
/// matched array counts its elements. Also registered as
/// `yaml_count_where` for predicate expressions.
pub fn count(name: &str, args: &[String]) -> ResolveResult<String> {
    let values = select(name, args)?;
    let n = match values.as_slice() {
        [Value::Array(arr)] => arr.len(),
        other => other.len(),
    };
    Ok(n.to_string())
}

/// `yaml_keys:expr:path` — keys of the matched mapping, comma-joined
pub fn keys(name: &str, args: &[String]) -> ResolveResult<String> {
    let values = select(name, args)?;
    match values.as_slice() {
        [Value::Object(map)] => Ok(map.keys().cloned().collect::<Vec<_>>().join(", ")),
        [other] => Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("'{}' is not a mapping ({})", args[0], type_name(other)),
        }),
        _ => Err(ResolveError::Argument {
            function: name.to_string(),
            reason: format!("'{}' must match exactly one mapping", args[0]),
        }),
    }
}

/// `yaml_collect:expr:path` — matched values comma-joined. Also registered
/// as `yaml_filter` for predicate expressions.
pub fn collect(name: &str, args: &[String]) -> ResolveResult<String> {
    let values = flatten(select(name, args)?);
    Ok(join(&values))
}

pub fn sum(name: &str, args: &[String]) -> ResolveResult<String> {
    let numbers = numeric(name, args)?;
    Ok(render_number(numbers.iter().sum()))
}

pub fn avg(name: &str, args: &[String]) -> ResolveResult<String> {
    let numbers = numeric(name, args)?;
    Ok(render_number(
        numbers.iter().sum::<f64>() / numbers.len() as f64,
    ))
}

pub fn max(name: &str, args: &[String]) -> ResolveResult<String> {
    let numbers = numeric(name, args)?;
    Ok(render_number(numbers.iter().copied().fold(f64::MIN, f64::max)))
}

pub fn min(name: &str, args: &[String]) -> ResolveResult<String> {
    let numbers = numeric(name, args)?;
    Ok(render_number(numbers.iter().copied().fold(f64::MAX, f64::min)))
}

fn select(name: &str, args: &[String]) -> ResolveResult<Vec<Value>> {
    expect_args(name, args, 2)?;
    // Compile before any I/O so a bad expression never reads the file.
    let expr = PathExpr::compile(name, &args[0])?;
    let document = load(name, &args[1])?;
    expr.select(name, &document)
}

fn load(name: &str, path: &str) -> ResolveResult<Value> {
    let content = read_source(name, path)?;
    serde_yaml::from_str(&content).map_err(|e| ResolveError::Argument {
        function: name.to_string(),
        reason: format!("failed to parse document {path}: {e}"),
    })
}

/// A selection of one array flattens to its elements, so `$.scores` and
/// `$.scores[*]` aggregate identically.
fn flatten(values: Vec<Value>) -> Vec<Value> {
    if values.len() == 1 {
        if let Value::Array(arr) = &values[0] {
            return arr.clone();
        }
    }
    values
}

fn numeric(name: &str, args: &[String]) -> ResolveResult<Vec<f64>> {
    let values = flatten(select(name, args)?);
    if values.is_empty() {
        return Err(ResolveError::NotFound {
            function: name.to_string(),
            missing: format!("numeric values at '{}'", args[0]),
            container: args[1].clone(),
        });
    }
    values
        .iter()
        .map(|value| {
            value.as_f64().ok_or_else(|| ResolveError::Argument {
                function: name.to_string(),
                reason: format!("non-numeric value {value} at '{}'", args[0]),
            })
        })
        .collect()
}

fn join(values: &[Value]) -> String {
    values.iter().map(render).collect::<Vec<_>>().join(", ")
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // Compact JSON for anything structured.
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
