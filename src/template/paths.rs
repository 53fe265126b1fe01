//! Path variable substitution
//!
//! `{{qs_id}}` and `{{artifacts}}` are textual substitutions that must run
//! before any function needs a concrete file path. `TARGET_FILE` is a bare
//! keyword replaced inside function arguments by the engine; it exists so a
//! sandbox path never has to travel through the template as a nested
//! `{{...}}` expression.

use crate::config::ResolverConfig;
use std::path::{Path, PathBuf};

/// Keyword replaced by the sandbox-generated file path of the current entry
pub const TARGET_FILE_KEYWORD: &str = "TARGET_FILE";

/// Caller-supplied identifiers for one generation unit
#[derive(Debug, Clone)]
pub struct EntryContext {
    pub question_id: u32,
    pub sample_number: u32,
    /// Path of the sandbox-generated file for this entry, when one exists
    pub target_file: Option<PathBuf>,
}

impl EntryContext {
    pub fn new(question_id: u32, sample_number: u32) -> Self {
        Self {
            question_id,
            sample_number,
            target_file: None,
        }
    }

    pub fn with_target_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_file = Some(path.into());
        self
    }

    /// The canonical `q{question_id}_s{sample_number}` identifier used to
    /// namespace sandbox paths
    pub fn qs_id(&self) -> String {
        format!("q{}_s{}", self.question_id, self.sample_number)
    }
}

/// Resolver for `{{qs_id}}` and `{{artifacts}}`
#[derive(Debug, Clone)]
pub struct PathResolver {
    artifacts_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            artifacts_dir: config.artifacts_dir.clone(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Substitute both path variables everywhere they occur. Purely
    /// textual, so ordering relative to other path variables is
    /// irrelevant.
    pub fn substitute(&self, template: &str, ctx: &EntryContext) -> String {
        template
            .replace("{{qs_id}}", &ctx.qs_id())
            .replace("{{artifacts}}", &self.artifacts_dir.to_string_lossy())
    }
}
