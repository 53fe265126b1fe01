//! Resolver configuration
//!
//! Configuration is an explicit value injected at construction time. The
//! artifacts base directory in particular is never resolved through ambient
//! lookup; whoever builds the resolver decides where sandbox artifacts live.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fallback artifacts directory when no configuration is supplied
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

const DEFAULT_MAX_EVAL_STEPS: usize = 64;

/// Configuration for a [`TemplateResolver`](crate::template::TemplateResolver)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base directory substituted for `{{artifacts}}`
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    /// Upper bound on function-evaluation steps per template, guarding
    /// against pathological or cyclic input
    #[serde(default = "default_max_eval_steps")]
    pub max_eval_steps: usize,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

fn default_max_eval_steps() -> usize {
    DEFAULT_MAX_EVAL_STEPS
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            max_eval_steps: default_max_eval_steps(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resolver config from {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse resolver config {}", path.display()))
    }

    /// Set the artifacts base directory
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
        assert!(config.max_eval_steps > 0);
    }

    #[test]
    fn test_load_from_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("resolver.yml");
        fs::write(&config_path, "artifacts_dir: /srv/sandbox/artifacts\n").unwrap();

        let config = ResolverConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.artifacts_dir,
            PathBuf::from("/srv/sandbox/artifacts")
        );
        // Unspecified fields fall back to defaults
        assert_eq!(config.max_eval_steps, DEFAULT_MAX_EVAL_STEPS);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = ResolverConfig::from_file(Path::new("/nonexistent/resolver.yml"));
        assert!(result.is_err());
    }
}
