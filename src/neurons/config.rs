//! Configuration for activation propagation and Hebbian reinforcement.
//!
//! All parameters have sensible defaults and can be overridden from YAML.

use serde::{Deserialize, Serialize};

/// Configuration for the propagation engine.
///
/// Each step spreads activation from every concept above
/// `active_threshold`, aggregates by max, normalizes by the sum, adds
/// Gaussian noise and clips to [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// A concept participates as a source only above this activation.
    pub active_threshold: f64,

    /// Concepts above this activation after a step get their activation
    /// counter and last-active cycle updated.
    pub record_threshold: f64,

    /// Steps of the initial propagation of each exploration.
    pub default_steps: usize,

    /// Temperature of the initial propagation of each exploration.
    /// Multiplicative cell noise is U(1-T, 1+T); additive noise has σ = T/2.
    pub default_temperature: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            active_threshold: 0.1,
            record_threshold: 0.3,
            default_steps: 3,
            default_temperature: 0.2,
        }
    }
}

/// Configuration for Hebbian reinforcement after a propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HebbianConfig {
    /// Concepts above this activation in the final snapshot count as co-active.
    pub co_activation_threshold: f64,

    /// Learning rate used by the cognition loop; 0 disables reinforcement.
    /// Existing edges grow by `rate × U(0,1)`; a missing edge is created with
    /// probability `rate × creation_factor`.
    pub rate: f64,

    /// Scales the probability of creating a brand-new relation.
    pub creation_factor: f64,
}

impl Default for HebbianConfig {
    fn default() -> Self {
        Self {
            co_activation_threshold: 0.2,
            rate: 0.1,
            creation_factor: 0.5,
        }
    }
}
