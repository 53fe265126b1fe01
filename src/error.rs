//! Structured error types for template resolution
//!
//! Every failure in the resolution pipeline is categorized so callers can
//! tell a malformed template apart from a missing sandbox source or a
//! missing row inside one that exists. The primary resolution path fails
//! fast on the first error; the diagnostic path captures these as strings
//! per call instead.

use thiserror::Error;

/// Result alias used throughout the resolution pipeline
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Main error type for template resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Unbalanced braces or malformed call syntax in the template text
    #[error("Template parse error at byte {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    /// Function name not present in the registry
    #[error("Unknown template function '{name}' (registered: {})", available.join(", "))]
    UnknownFunction { name: String, available: Vec<String> },

    /// Wrong argument count or an argument that does not parse
    #[error("Invalid arguments for '{function}': {reason}")]
    Argument { function: String, reason: String },

    /// Referenced file, database, or table does not exist
    #[error("{function}: source {missing} does not exist")]
    SourceNotFound { function: String, missing: String },

    /// Referenced row, column, key, or path segment missing from an
    /// existing source
    #[error("{function}: {missing} not found in {container}")]
    NotFound {
        function: String,
        missing: String,
        container: String,
    },

    /// `TARGET_FILE` or another path variable referenced without a binding
    #[error("Path variable '{variable}' has no binding: {reason}")]
    PathResolution { variable: String, reason: String },

    /// Evaluation did not converge within the configured step budget
    #[error("Template did not converge after {steps} evaluation steps")]
    EvaluationLimit { steps: usize },
}

impl ResolveError {
    /// Short category tag, used by diagnostic output and tests that assert
    /// on error kinds without matching full messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Parse { .. } => "parse",
            ResolveError::UnknownFunction { .. } => "unknown_function",
            ResolveError::Argument { .. } => "argument",
            ResolveError::SourceNotFound { .. } => "source_not_found",
            ResolveError::NotFound { .. } => "not_found",
            ResolveError::PathResolution { .. } => "path_resolution",
            ResolveError::EvaluationLimit { .. } => "evaluation_limit",
        }
    }
}
