//! Template function evaluation engine
//!
//! Evaluates every `{{name:arg1:...:argK}}` expression left in a template
//! after variable substitution. Calls are located by balanced-brace
//! scanning and evaluated innermost-first, so a call whose arguments
//! contain further `{{...}}` expressions receives fully resolved argument
//! text. A naive non-greedy regex cannot do this: argument text may itself
//! contain literal `{{`/`}}` pairs belonging to nested calls.

use crate::error::{ResolveError, ResolveResult};
use crate::functions::FunctionRegistry;
use crate::template::paths::TARGET_FILE_KEYWORD;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Engine evaluating function-call expressions against the registry
pub struct FunctionEngine {
    registry: FunctionRegistry,
    max_steps: usize,
}

/// Outcome of a diagnostic (non-aborting) evaluation pass
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    /// Template text with every evaluated call substituted; failed calls
    /// are removed
    pub substituted: String,
    /// Call text mapped to its result, or to `error: ...` when it failed
    pub results: HashMap<String, String>,
    /// Every failure encountered, in evaluation order
    pub errors: Vec<String>,
}

impl FunctionEngine {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            max_steps: 64,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Evaluate every call, failing fast on the first error. Returns the
    /// substituted text and a map of call text to result.
    pub fn evaluate(
        &self,
        template: &str,
        target_file: Option<&Path>,
    ) -> ResolveResult<(String, HashMap<String, String>)> {
        let mut text = template.to_string();
        let mut results = HashMap::new();
        let mut steps = 0;

        while let Some((start, end)) = innermost_span(&text)? {
            steps += 1;
            if steps > self.max_steps {
                return Err(ResolveError::EvaluationLimit {
                    steps: self.max_steps,
                });
            }
            let call_text = text[start..end].to_string();
            let value = self.dispatch(&call_text, target_file)?;
            debug!(call = %call_text, value = %value, "evaluated template function");
            results.insert(call_text, value.clone());
            text.replace_range(start..end, &value);
        }

        Ok((text, results))
    }

    /// Diagnostic variant: record each call's outcome instead of aborting.
    /// Failed calls substitute as empty strings so evaluation can continue
    /// past them; this re-evaluation is safe because functions are pure
    /// reads.
    pub fn evaluate_diagnostic(
        &self,
        template: &str,
        target_file: Option<&Path>,
    ) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome {
            substituted: template.to_string(),
            ..Default::default()
        };
        let mut steps = 0;

        loop {
            let span = match innermost_span(&outcome.substituted) {
                Ok(Some(span)) => span,
                Ok(None) => break,
                Err(e) => {
                    outcome.errors.push(e.to_string());
                    break;
                }
            };
            steps += 1;
            if steps > self.max_steps {
                outcome
                    .errors
                    .push(ResolveError::EvaluationLimit { steps: self.max_steps }.to_string());
                break;
            }

            let (start, end) = span;
            let call_text = outcome.substituted[start..end].to_string();
            match self.dispatch(&call_text, target_file) {
                Ok(value) => {
                    outcome.results.insert(call_text, value.clone());
                    outcome.substituted.replace_range(start..end, &value);
                }
                Err(e) => {
                    warn!(call = %call_text, error = %e, "template function failed");
                    outcome.results.insert(call_text.clone(), format!("error: {e}"));
                    outcome.errors.push(format!("{call_text}: {e}"));
                    outcome.substituted.replace_range(start..end, "");
                }
            }
        }

        outcome
    }

    /// Split a call into name and arguments, apply `TARGET_FILE`
    /// indirection per argument, and dispatch through the registry.
    fn dispatch(&self, call_text: &str, target_file: Option<&Path>) -> ResolveResult<String> {
        let body = &call_text[2..call_text.len() - 2];
        let mut parts = body.split(':');
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(ResolveError::Parse {
                offset: 0,
                reason: format!("call '{call_text}' has no function name"),
            });
        }

        let mut args: Vec<String> = parts.map(str::to_string).collect();
        for arg in &mut args {
            if arg.contains(TARGET_FILE_KEYWORD) {
                let Some(path) = target_file else {
                    return Err(ResolveError::PathResolution {
                        variable: TARGET_FILE_KEYWORD.to_string(),
                        reason: "no sandbox-generated file is bound for this entry".to_string(),
                    });
                };
                *arg = arg.replace(TARGET_FILE_KEYWORD, &path.to_string_lossy());
            }
        }

        self.registry.call(name, &args)
    }
}

/// Locate the innermost `{{...}}` span: the first `}}` closes the most
/// recently opened `{{`, which by construction contains no nested braces.
/// Returns byte offsets of the span including its braces.
fn innermost_span(text: &str) -> ResolveResult<Option<(usize, usize)>> {
    let bytes = text.as_bytes();
    let mut open_stack: Vec<usize> = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            open_stack.push(i);
            i += 2;
            continue;
        }
        if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            return match open_stack.pop() {
                Some(start) => Ok(Some((start, i + 2))),
                None => Err(ResolveError::Parse {
                    offset: i,
                    reason: "'}}' without matching '{{'".to_string(),
                }),
            };
        }
        i += 1;
    }

    match open_stack.first() {
        Some(start) => Err(ResolveError::Parse {
            offset: *start,
            reason: "'{{' without matching '}}'".to_string(),
        }),
        None => Ok(None),
    }
}
