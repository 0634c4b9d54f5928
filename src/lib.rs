//! Cognitive Core
//!
//! The computational core of a personal-assistant "organism":
//! - Concept graph with feature vectors and a dense weight matrix
//! - Vectorized spreading activation and Hebbian reinforcement
//! - Tabular Q-learning over concept pairs
//! - Capacity-bounded, time-decaying associative cache
//! - Autonomous cognition loop with a persisted diary

pub mod cognition;
pub mod concepts;
pub mod demo;
pub mod error;
pub mod events;
pub mod graph;
pub mod learning;
pub mod memory;
pub mod neurons;
pub mod organism;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{CoreError, CoreResult};
pub use organism::{Organism, SharedOrganism};

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use cognition::CognitionConfig;
use concepts::StoreConfig;
use learning::LearningConfig;
use memory::CacheConfig;
use neurons::{HebbianConfig, PropagationConfig};

const DEFAULT_RNG_SEED: u64 = 42;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct YamlConfig {
    pub store: StoreConfig,
    pub propagation: PropagationConfig,
    pub hebbian: HebbianConfig,
    pub learning: LearningConfig,
    pub cache: CacheConfig,
    pub cognition: CognitionConfig,
    /// Seed from which every component's generator is derived
    pub rng_seed: u64,
}

impl Default for YamlConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            propagation: PropagationConfig::default(),
            hebbian: HebbianConfig::default(),
            learning: LearningConfig::default(),
            cache: CacheConfig::default(),
            cognition: CognitionConfig::default(),
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub propagation: PropagationConfig,
    pub hebbian: HebbianConfig,
    pub learning: LearningConfig,
    pub cache: CacheConfig,
    pub cognition: CognitionConfig,
    pub rng_seed: u64,
}

impl From<YamlConfig> for Config {
    fn from(yaml: YamlConfig) -> Self {
        Self {
            store: yaml.store,
            propagation: yaml.propagation,
            hebbian: yaml.hebbian,
            learning: yaml.learning,
            cache: yaml.cache,
            cognition: yaml.cognition,
            rng_seed: yaml.rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        YamlConfig::default().into()
    }
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "cognition.yaml" in CWD. If the file
    /// doesn't exist, falls back to env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);
        Ok(Self::from(yaml).with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides looked up by environment variable name. Unparseable
    /// values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = lookup("COGNITION_BASE_INTERVAL_MS").and_then(|s| s.parse().ok()) {
            self.cognition.base_interval_ms = ms;
        }
        if let Some(path) = lookup("COGNITION_JOURNAL_PATH").filter(|s| !s.is_empty()) {
            self.cognition.journal_path = Some(PathBuf::from(path));
        }
        if let Some(seed) = lookup("COGNITION_RNG_SEED").and_then(|s| s.parse().ok()) {
            self.rng_seed = seed;
        }
        if let Some(capacity) = lookup("CACHE_CAPACITY").and_then(|s| s.parse().ok()) {
            self.cache.capacity = capacity;
        }
        if let Some(dims) = lookup("STORE_DIMENSIONS")
            .and_then(|s| s.parse().ok())
            .filter(|d: &usize| *d > 0)
        {
            self.store.dimensions = dims;
        }
        self
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("cognition.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
rng_seed: 7

store:
  dimensions: 16
  default_uncertainty: 0.0

learning:
  alpha: 0.2
  epsilon: 0.5

cache:
  capacity: 32

cognition:
  base_interval_ms: 100
  consolidate_every: 5
  journal_path: /tmp/diary.jsonl
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.store.dimensions, 16);
        assert_eq!(config.store.default_uncertainty, 0.0);
        assert_eq!(config.learning.alpha, 0.2);
        assert_eq!(config.learning.gamma, 0.9);
        assert_eq!(config.cache.capacity, 32);
        assert_eq!(config.cognition.consolidate_every, 5);
        assert_eq!(
            config.cognition.journal_path.as_deref(),
            Some(Path::new("/tmp/diary.jsonl"))
        );
        // untouched sections keep their defaults
        assert_eq!(config.propagation.active_threshold, 0.1);
        assert_eq!(config.hebbian.rate, 0.1);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = Config::default();
        assert_eq!(config.rng_seed, DEFAULT_RNG_SEED);
        assert_eq!(config.store.dimensions, 32);
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.cognition.base_interval_ms, 5_000);
        assert!(config.cognition.journal_path.is_none());
    }

    #[test]
    fn test_env_overrides_take_priority() {
        let env: HashMap<&str, &str> = [
            ("COGNITION_BASE_INTERVAL_MS", "250"),
            ("COGNITION_JOURNAL_PATH", "diary.jsonl"),
            ("COGNITION_RNG_SEED", "99"),
            ("CACHE_CAPACITY", "8"),
            ("STORE_DIMENSIONS", "4"),
        ]
        .into_iter()
        .collect();
        let config =
            Config::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.cognition.base_interval_ms, 250);
        assert_eq!(
            config.cognition.journal_path,
            Some(PathBuf::from("diary.jsonl"))
        );
        assert_eq!(config.rng_seed, 99);
        assert_eq!(config.cache.capacity, 8);
        assert_eq!(config.store.dimensions, 4);
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let config = Config::default().with_overrides(|key| match key {
            "CACHE_CAPACITY" => Some("lots".into()),
            "STORE_DIMENSIONS" => Some("0".into()),
            _ => None,
        });
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.store.dimensions, 32);
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rng_seed: 5\ncache:\n  capacity: 12").unwrap();
        let yaml = Config::load_yaml(Some(file.path()));
        assert_eq!(yaml.rng_seed, 5);
        assert_eq!(yaml.cache.capacity, 12);
    }

    #[test]
    fn test_missing_or_invalid_file_falls_back() {
        let yaml = Config::load_yaml(Some(Path::new("/nonexistent/cognition.yaml")));
        assert_eq!(yaml.rng_seed, DEFAULT_RNG_SEED);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache: [not, a, map]").unwrap();
        let yaml = Config::load_yaml(Some(file.path()));
        assert_eq!(yaml.cache.capacity, 256);
    }
}
