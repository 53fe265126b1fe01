//! Entity, semantic, and numeric placeholder resolution
//!
//! Scans a template for `{{entityN[:pool]}}`, `{{semanticN:kind}}`, and
//! `{{numberN:min:max[:format]}}` placeholders, resolves each distinct key
//! exactly once through the binding session, and substitutes every
//! occurrence with the cached value.

use crate::error::ResolveResult;
use crate::template::entity::{EntityPools, NumericSpec, SemanticKind};
use crate::template::session::BindingSession;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(entity[A-Za-z0-9_]*)(?::([A-Za-z0-9_]+))?\}\}")
        .expect("Invalid entity pattern")
});

static SEMANTIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(semantic[A-Za-z0-9_]*):([A-Za-z0-9_]+)\}\}")
        .expect("Invalid semantic pattern")
});

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(number[A-Za-z0-9_]*):(-?\d+(?:\.\d+)?):(-?\d+(?:\.\d+)?)(?::([a-z]+))?\}\}")
        .expect("Invalid number pattern")
});

/// Resolver for randomized variable placeholders
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    pools: EntityPools,
}

impl VariableResolver {
    pub fn new(pools: EntityPools) -> Self {
        Self { pools }
    }

    pub fn pools(&self) -> &EntityPools {
        &self.pools
    }

    /// Substitute every variable placeholder, failing fast on the first
    /// invalid key. Identical keys share one binding via the session.
    pub fn substitute(
        &self,
        template: &str,
        session: &mut BindingSession,
    ) -> ResolveResult<String> {
        let mut out = template.to_string();
        for caps in ENTITY_RE.captures_iter(template) {
            let (token, value) = self.resolve_entity(&caps, session)?;
            out = out.replace(token, &value);
        }
        for caps in SEMANTIC_RE.captures_iter(template) {
            let (token, value) = self.resolve_semantic(&caps, session)?;
            out = out.replace(token, &value);
        }
        for caps in NUMBER_RE.captures_iter(template) {
            let (token, value) = self.resolve_number(&caps, session)?;
            out = out.replace(token, &value);
        }
        debug!(bound = session.len(), "variable substitution complete");
        Ok(out)
    }

    /// Diagnostic variant: invalid keys are recorded and removed from the
    /// output instead of aborting the pass.
    pub fn substitute_lenient(
        &self,
        template: &str,
        session: &mut BindingSession,
    ) -> (String, Vec<String>) {
        let mut out = template.to_string();
        let mut errors = Vec::new();

        for caps in ENTITY_RE.captures_iter(template) {
            match self.resolve_entity(&caps, session) {
                Ok((token, value)) => out = out.replace(token, &value),
                Err(e) => record_failure(&caps, e, &mut out, &mut errors),
            }
        }
        for caps in SEMANTIC_RE.captures_iter(template) {
            match self.resolve_semantic(&caps, session) {
                Ok((token, value)) => out = out.replace(token, &value),
                Err(e) => record_failure(&caps, e, &mut out, &mut errors),
            }
        }
        for caps in NUMBER_RE.captures_iter(template) {
            match self.resolve_number(&caps, session) {
                Ok((token, value)) => out = out.replace(token, &value),
                Err(e) => record_failure(&caps, e, &mut out, &mut errors),
            }
        }

        (out, errors)
    }

    fn resolve_entity<'t>(
        &self,
        caps: &Captures<'t>,
        session: &mut BindingSession,
    ) -> ResolveResult<(&'t str, String)> {
        let token = caps.get(0).unwrap().as_str();
        let key = variable_key(token);
        let pool = caps.get(2).map(|m| m.as_str());
        // Validate the pool before binding so the generator itself is
        // infallible.
        let members = self.pools.members(pool)?;
        let value = session.get_or_create(key, |rng| {
            use rand::Rng;
            members[rng.random_range(0..members.len())].clone()
        });
        Ok((token, value))
    }

    fn resolve_semantic<'t>(
        &self,
        caps: &Captures<'t>,
        session: &mut BindingSession,
    ) -> ResolveResult<(&'t str, String)> {
        let token = caps.get(0).unwrap().as_str();
        let key = variable_key(token);
        let kind = SemanticKind::parse(caps.get(2).unwrap().as_str())?;
        let value = session.get_or_create(key, |rng| kind.generate(rng));
        Ok((token, value))
    }

    fn resolve_number<'t>(
        &self,
        caps: &Captures<'t>,
        session: &mut BindingSession,
    ) -> ResolveResult<(&'t str, String)> {
        let token = caps.get(0).unwrap().as_str();
        let key = variable_key(token);
        let spec = NumericSpec::parse(
            caps.get(2).unwrap().as_str(),
            caps.get(3).unwrap().as_str(),
            caps.get(4).map(|m| m.as_str()),
        )?;
        let value = session.get_or_create(key, |rng| spec.sample(rng));
        Ok((token, value))
    }
}

/// The variable key is the placeholder body without the surrounding braces,
/// e.g. `entity1:colors` for `{{entity1:colors}}`.
fn variable_key(token: &str) -> &str {
    &token[2..token.len() - 2]
}

fn record_failure(
    caps: &Captures<'_>,
    error: crate::error::ResolveError,
    out: &mut String,
    errors: &mut Vec<String>,
) {
    let token = caps.get(0).unwrap().as_str();
    errors.push(format!("{token}: {error}"));
    *out = out.replace(token, "");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VariableResolver {
        VariableResolver::new(EntityPools::builtin())
    }

    #[test]
    fn test_bare_entity_substitution() {
        let mut session = BindingSession::with_seed(3);
        let out = resolver()
            .substitute("Find the {{entity1}} file.", &mut session)
            .unwrap();
        assert!(!out.contains("{{"));
        assert!(session.bindings().contains_key("entity1"));
    }

    #[test]
    fn test_same_key_resolves_identically_everywhere() {
        let mut session = BindingSession::with_seed(9);
        let out = resolver()
            .substitute(
                "The {{entity1}} report mentions {{entity2}}, then {{entity1}} again.",
                &mut session,
            )
            .unwrap();

        let e1 = session.bindings().get("entity1").unwrap().clone();
        let e2 = session.bindings().get("entity2").unwrap().clone();
        assert!(out.matches(e1.as_str()).count() >= 2, "out={out} e1={e1}");
        assert!(out.contains(e2.as_str()));
    }

    #[test]
    fn test_pooled_and_bare_keys_are_distinct() {
        let mut session = BindingSession::with_seed(5);
        resolver()
            .substitute("{{entity1}} vs {{entity1:colors}}", &mut session)
            .unwrap();
        assert!(session.bindings().contains_key("entity1"));
        assert!(session.bindings().contains_key("entity1:colors"));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_pooled_entity_comes_from_pool() {
        let mut session = BindingSession::with_seed(13);
        resolver()
            .substitute("a {{entity1:gems}} ring", &mut session)
            .unwrap();
        let value = session.bindings().get("entity1:gems").unwrap();
        let pools = EntityPools::builtin();
        assert!(pools.members(Some("gems")).unwrap().contains(value));
    }

    #[test]
    fn test_semantic_and_number_placeholders() {
        let mut session = BindingSession::with_seed(21);
        let out = resolver()
            .substitute(
                "{{semantic1:person}} from {{semantic2:city}} spent {{number1:10:50:currency}}",
                &mut session,
            )
            .unwrap();
        assert!(!out.contains("{{"));
        assert!(out.contains('$'));
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_unknown_pool_fails_fast() {
        let mut session = BindingSession::with_seed(1);
        let err = resolver()
            .substitute("{{entity1:planets}}", &mut session)
            .unwrap_err();
        assert_eq!(err.kind(), "argument");
    }

    #[test]
    fn test_lenient_mode_collects_errors_and_strips_tokens() {
        let mut session = BindingSession::with_seed(1);
        let (out, errors) = resolver().substitute_lenient(
            "{{entity1:planets}} and {{entity2:colors}}",
            &mut session,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("planets"));
        assert!(!out.contains("{{entity1:planets}}"));
        assert!(session.bindings().contains_key("entity2:colors"));
    }

    #[test]
    fn test_unrelated_tokens_left_alone() {
        let mut session = BindingSession::with_seed(1);
        let out = resolver()
            .substitute("{{file_line:3:data.txt}} stays", &mut session)
            .unwrap();
        assert_eq!(out, "{{file_line:3:data.txt}} stays");
        assert!(session.is_empty());
    }
}
