//! Session-scoped variable bindings
//!
//! A [`BindingSession`] caches every randomized value drawn while resolving
//! one generation unit (one question_id + sample_number pair), so a variable
//! key that recurs anywhere in that unit resolves to the same value. The
//! session owns the random source; constructing it with a fixed seed makes
//! `clear()` + re-resolve reproduce identical output for regression tests.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::trace;

/// Per-generation-unit cache of variable bindings
#[derive(Debug)]
pub struct BindingSession {
    bindings: HashMap<String, String>,
    rng: StdRng,
    seed: Option<u64>,
}

impl Default for BindingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingSession {
    /// Create an unseeded session backed by OS entropy
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            rng: StdRng::from_os_rng(),
            seed: None,
        }
    }

    /// Create a session with a fixed seed for deterministic replay
    pub fn with_seed(seed: u64) -> Self {
        Self {
            bindings: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Return the cached value for `key`, invoking `generate` with the
    /// session RNG only on the first reference. Later calls for the same
    /// key return the cached value unconditionally.
    pub fn get_or_create<F>(&mut self, key: &str, generate: F) -> String
    where
        F: FnOnce(&mut StdRng) -> String,
    {
        if let Some(value) = self.bindings.get(key) {
            return value.clone();
        }
        let value = generate(&mut self.rng);
        trace!(key, value = %value, "bound template variable");
        self.bindings.insert(key.to_string(), value.clone());
        value
    }

    /// Discard all bindings. A seeded session also rewinds its RNG to the
    /// construction seed, so the next resolution reproduces the same values.
    pub fn clear(&mut self) {
        self.bindings.clear();
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    /// All bindings created so far, keyed by the full variable key
    pub fn bindings(&self) -> &HashMap<String, String> {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_first_reference_generates_later_references_reuse() {
        let mut session = BindingSession::new();
        let mut calls = 0;

        let first = session.get_or_create("entity1", |rng| {
            calls += 1;
            format!("value-{}", rng.random_range(0..1000))
        });
        let second = session.get_or_create("entity1", |_| {
            calls += 1;
            "never".to_string()
        });

        assert_eq!(first, second);
        assert_eq!(calls, 1);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_distinct_keys_are_distinct_bindings() {
        let mut session = BindingSession::with_seed(7);
        session.get_or_create("entity1", |rng| rng.random_range(0..100).to_string());
        session.get_or_create("entity2", |rng| rng.random_range(0..100).to_string());
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_clear_discards_bindings() {
        let mut session = BindingSession::new();
        session.get_or_create("entity1", |_| "a".to_string());
        assert!(!session.is_empty());
        session.clear();
        assert!(session.is_empty());
    }

    #[test]
    fn test_seeded_session_reproduces_after_clear() {
        let mut session = BindingSession::with_seed(42);
        let draw = |rng: &mut rand::rngs::StdRng| rng.random_range(0..u64::MAX).to_string();

        let first_a = session.get_or_create("a", draw);
        let first_b = session.get_or_create("b", draw);
        session.clear();
        let second_a = session.get_or_create("a", draw);
        let second_b = session.get_or_create("b", draw);

        assert_eq!(first_a, second_a);
        assert_eq!(first_b, second_b);
    }

    #[test]
    fn test_unseeded_session_varies_after_clear() {
        let mut session = BindingSession::new();
        let draw = |rng: &mut rand::rngs::StdRng| rng.random_range(0..u64::MAX).to_string();

        // Draw enough values that a collision across clears is implausible.
        let first: Vec<String> = (0..4)
            .map(|i| session.get_or_create(&format!("k{i}"), draw))
            .collect();
        session.clear();
        let second: Vec<String> = (0..4)
            .map(|i| session.get_or_create(&format!("k{i}"), draw))
            .collect();

        assert_ne!(first, second);
    }
}
