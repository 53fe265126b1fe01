//! Path expressions over structured documents
//!
//! Supports an optional `$` root, dotted field access, `[N]` indexing,
//! `[*]` array wildcards, and `[?field OP value]` comparison predicates
//! with OP in {==, !=, >, <, >=, <=}. A field or index that matches
//! nothing in an otherwise non-empty selection is a NotFound error naming
//! the missing segment; wildcards and predicates may legitimately narrow a
//! selection to nothing.

use crate::error::{ResolveError, ResolveResult};
use serde_json::Value;

/// A compiled path expression
#[derive(Debug, Clone)]
pub struct PathExpr {
    expression: String,
    components: Vec<PathComponent>,
}

#[derive(Debug, Clone)]
enum PathComponent {
    Field(String),
    Index(usize),
    Wildcard,
    Predicate(Predicate),
}

#[derive(Debug, Clone)]
struct Predicate {
    field: String,
    op: CompareOp,
    value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl PathExpr {
    /// Compile a path expression like `$.users[*].name` or
    /// `items[?price>10].sku`
    pub fn compile(function: &str, expr: &str) -> ResolveResult<Self> {
        let mut components = Vec::new();
        let mut rest = expr.trim();
        if let Some(stripped) = rest.strip_prefix('$') {
            rest = stripped;
        }
        rest = rest.strip_prefix('.').unwrap_or(rest);

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']').ok_or_else(|| ResolveError::Argument {
                    function: function.to_string(),
                    reason: format!("unclosed '[' in path '{expr}'"),
                })?;
                let inside = &after[..end];
                rest = &after[end + 1..];

                if inside == "*" {
                    components.push(PathComponent::Wildcard);
                } else if let Some(predicate) = inside.strip_prefix('?') {
                    let predicate = predicate
                        .strip_prefix('(')
                        .and_then(|p| p.strip_suffix(')'))
                        .unwrap_or(predicate);
                    components.push(PathComponent::Predicate(Predicate::parse(
                        function, expr, predicate,
                    )?));
                } else {
                    let index = inside.parse().map_err(|_| ResolveError::Argument {
                        function: function.to_string(),
                        reason: format!("invalid array index '{inside}' in path '{expr}'"),
                    })?;
                    components.push(PathComponent::Index(index));
                }
            } else {
                let end = rest
                    .find(|c| c == '.' || c == '[')
                    .unwrap_or(rest.len());
                let field = &rest[..end];
                if field.is_empty() {
                    return Err(ResolveError::Argument {
                        function: function.to_string(),
                        reason: format!("empty segment in path '{expr}'"),
                    });
                }
                components.push(PathComponent::Field(field.to_string()));
                rest = &rest[end..];
            }

            rest = rest.strip_prefix('.').unwrap_or(rest);
        }

        Ok(Self {
            expression: expr.to_string(),
            components,
        })
    }

    /// Select every value the path matches in `data`
    pub fn select(&self, function: &str, data: &Value) -> ResolveResult<Vec<Value>> {
        let mut results = vec![data.clone()];

        for component in &self.components {
            let had_results = !results.is_empty();
            let mut next = Vec::new();

            match component {
                PathComponent::Field(field) => {
                    for value in &results {
                        if let Some(v) = value.get(field) {
                            next.push(v.clone());
                        }
                    }
                    if had_results && next.is_empty() {
                        return Err(self.not_found(function, format!("key '{field}'")));
                    }
                }
                PathComponent::Index(index) => {
                    for value in &results {
                        if let Value::Array(arr) = value {
                            if let Some(v) = arr.get(*index) {
                                next.push(v.clone());
                            }
                        }
                    }
                    if had_results && next.is_empty() {
                        return Err(self.not_found(function, format!("index {index}")));
                    }
                }
                PathComponent::Wildcard => {
                    for value in &results {
                        if let Value::Array(arr) = value {
                            next.extend(arr.iter().cloned());
                        }
                    }
                }
                PathComponent::Predicate(predicate) => {
                    for value in &results {
                        match value {
                            Value::Array(arr) => {
                                next.extend(
                                    arr.iter().filter(|item| predicate.matches(item)).cloned(),
                                );
                            }
                            other => {
                                if predicate.matches(other) {
                                    next.push(other.clone());
                                }
                            }
                        }
                    }
                }
            }

            results = next;
        }

        Ok(results)
    }

    fn not_found(&self, function: &str, missing: String) -> ResolveError {
        ResolveError::NotFound {
            function: function.to_string(),
            missing,
            container: format!("path '{}'", self.expression),
        }
    }
}

impl Predicate {
    fn parse(function: &str, expr: &str, raw: &str) -> ResolveResult<Self> {
        let raw = raw.trim();
        let raw = raw.strip_prefix("@.").unwrap_or(raw);

        // Two-character operators first so `>=` is not read as `>`.
        const OPS: &[(&str, CompareOp)] = &[
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
            ("=", CompareOp::Eq),
        ];

        for (op_str, op) in OPS {
            if let Some(pos) = raw.find(op_str) {
                let field = raw[..pos].trim();
                let literal = raw[pos + op_str.len()..].trim();
                if field.is_empty() || literal.is_empty() {
                    break;
                }
                return Ok(Self {
                    field: field.to_string(),
                    op: *op,
                    value: parse_literal(literal),
                });
            }
        }

        Err(ResolveError::Argument {
            function: function.to_string(),
            reason: format!("unsupported predicate '{raw}' in path '{expr}'"),
        })
    }

    fn matches(&self, item: &Value) -> bool {
        let actual = item.get(&self.field);
        match self.op {
            CompareOp::Eq => equals(actual, &self.value),
            CompareOp::Ne => !equals(actual, &self.value),
            CompareOp::Gt | CompareOp::Lt | CompareOp::Ge | CompareOp::Le => {
                let (Some(a), Some(b)) = (actual.and_then(Value::as_f64), self.value.as_f64())
                else {
                    return false;
                };
                match self.op {
                    CompareOp::Gt => a > b,
                    CompareOp::Lt => a < b,
                    CompareOp::Ge => a >= b,
                    CompareOp::Le => a <= b,
                    _ => unreachable!(),
                }
            }
        }
    }
}

/// Numeric equality compares by value, so `25` in a document matches a
/// `25.0` literal.
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(a), b) => a == b,
        (None, _) => false,
    }
}

fn parse_literal(raw: &str) -> Value {
    if (raw.starts_with('\'') && raw.ends_with('\'') && raw.len() >= 2)
        || (raw.starts_with('"') && raw.ends_with('"') && raw.len() >= 2)
    {
        return Value::String(raw[1..raw.len() - 1].to_string());
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(float) = raw.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}
