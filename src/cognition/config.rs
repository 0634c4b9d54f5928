//! Configuration for the cognition loop.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Tunables for the curiosity → explore → reflect → integrate loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CognitionConfig {
    /// Rest between cycles before the verdict multiplier is applied.
    pub base_interval_ms: u64,

    /// Run the consolidation pass every N cycles (0 disables it).
    pub consolidate_every: u64,

    /// Probability that curiosity adds a uniformly random concept.
    pub random_pick_probability: f64,

    /// Number of recent activations kept per concept for trend detection.
    pub trend_window: usize,

    // Exploration. The initial propagation uses the `propagation` section's
    // default steps and temperature.
    pub refine_temperature: f64,
    pub max_refine_iterations: usize,
    /// Refinement stops once the mean absolute change per concept falls
    /// below this value.
    pub convergence_tolerance: f64,

    /// Both concepts of a pair must exceed this activation to count as
    /// co-active.
    pub co_activation_threshold: f64,

    /// Relations below this weight count as weak.
    pub weak_edge_threshold: f64,

    // Integration
    /// Hebbian reinforcement runs when the reflection score exceeds this.
    /// The rate itself comes from the `hebbian` section.
    pub reinforce_threshold: f64,

    /// JSONL diary location; `None` keeps the diary in memory.
    pub journal_path: Option<PathBuf>,
}

impl Default for CognitionConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 5_000,
            consolidate_every: 20,
            random_pick_probability: 0.15,
            trend_window: 6,
            refine_temperature: 0.05,
            max_refine_iterations: 6,
            convergence_tolerance: 0.05,
            co_activation_threshold: 0.2,
            weak_edge_threshold: 0.3,
            reinforce_threshold: 0.5,
            journal_path: None,
        }
    }
}

impl CognitionConfig {
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }
}
