//! Template resolution pipeline
//!
//! Turns a template string plus a small set of contextual identifiers into
//! a fully resolved question and a structured record of how it resolved.
//! Control flow per template: qs_id substitution → artifacts substitution →
//! entity/semantic/numeric substitution via the binding session → function
//! evaluation (innermost-first) → [`ResolvedTemplate`].

pub mod engine;
pub mod entity;
pub mod paths;
pub mod session;
pub mod variables;

pub use engine::{EvaluationOutcome, FunctionEngine};
pub use entity::{EntityPools, NumericFormat, NumericSpec, SemanticKind};
pub use paths::{EntryContext, PathResolver, TARGET_FILE_KEYWORD};
pub use session::BindingSession;
pub use variables::VariableResolver;

use crate::config::ResolverConfig;
use crate::error::ResolveResult;
use crate::functions::FunctionRegistry;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// The full record of one template resolution
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedTemplate {
    /// Template text as supplied by the caller
    pub original: String,
    /// Fully substituted text
    pub substituted: String,
    /// Every distinct variable key bound during resolution, including path
    /// variables, so other fields of the same test entry can reuse them
    pub variables: HashMap<String, String>,
    /// Function-call text mapped to its result (or error string in
    /// diagnostic mode)
    pub function_results: HashMap<String, String>,
    /// Non-fatal errors from a diagnostic pass; always empty on the
    /// fail-fast path
    pub errors: Vec<String>,
}

/// Resolver wiring the pipeline stages together
pub struct TemplateResolver {
    variables: VariableResolver,
    paths: PathResolver,
    engine: FunctionEngine,
    max_steps: usize,
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl TemplateResolver {
    /// A resolver with the built-in pools and the standard function set
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            variables: VariableResolver::new(EntityPools::builtin()),
            paths: PathResolver::new(config),
            engine: FunctionEngine::new(FunctionRegistry::standard())
                .with_max_steps(config.max_eval_steps),
            max_steps: config.max_eval_steps,
        }
    }

    /// Replace the entity pool source
    pub fn with_pools(mut self, pools: EntityPools) -> Self {
        self.variables = VariableResolver::new(pools);
        self
    }

    /// Replace the function registry
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.engine = FunctionEngine::new(registry).with_max_steps(self.max_steps);
        self
    }

    /// Resolve one template, failing fast on the first error. The session
    /// must belong exclusively to the current generation unit.
    pub fn resolve(
        &self,
        template: &str,
        ctx: &EntryContext,
        session: &mut BindingSession,
    ) -> ResolveResult<ResolvedTemplate> {
        debug!(qs_id = %ctx.qs_id(), "resolving template");
        let with_paths = self.paths.substitute(template, ctx);
        let with_vars = self.variables.substitute(&with_paths, session)?;
        let (substituted, function_results) = self
            .engine
            .evaluate(&with_vars, ctx.target_file.as_deref())?;

        Ok(ResolvedTemplate {
            original: template.to_string(),
            substituted,
            variables: self.collect_variables(template, ctx, session),
            function_results,
            errors: Vec::new(),
        })
    }

    /// Diagnostic variant: collect per-call outcomes and errors instead of
    /// aborting, for fixtures that assert on error kinds.
    pub fn resolve_diagnostic(
        &self,
        template: &str,
        ctx: &EntryContext,
        session: &mut BindingSession,
    ) -> ResolvedTemplate {
        debug!(qs_id = %ctx.qs_id(), "resolving template (diagnostic)");
        let with_paths = self.paths.substitute(template, ctx);
        let (with_vars, mut errors) = self.variables.substitute_lenient(&with_paths, session);
        let outcome = self
            .engine
            .evaluate_diagnostic(&with_vars, ctx.target_file.as_deref());
        errors.extend(outcome.errors);

        ResolvedTemplate {
            original: template.to_string(),
            substituted: outcome.substituted,
            variables: self.collect_variables(template, ctx, session),
            function_results: outcome.results,
            errors,
        }
    }

    fn collect_variables(
        &self,
        template: &str,
        ctx: &EntryContext,
        session: &BindingSession,
    ) -> HashMap<String, String> {
        let mut variables = session.bindings().clone();
        if template.contains("{{qs_id}}") {
            variables.insert("qs_id".to_string(), ctx.qs_id());
        }
        if template.contains("{{artifacts}}") {
            variables.insert(
                "artifacts".to_string(),
                self.paths.artifacts_dir().to_string_lossy().into_owned(),
            );
        }
        variables
    }
}
