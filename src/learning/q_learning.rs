//! Tabular Q-learning over concept pairs.
//!
//! The table is sparse (absent pairs read as 0.0) and lives independently
//! of the graph's stored weights. [`QLearner::suggest_weight_deltas`] is the
//! only bridge: callers decide when and whether to apply the deltas.

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Size of a suggested weight delta at |Q| ≥ 1.
const DELTA_SCALE: f64 = 0.05;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Initial exploration probability ε
    pub epsilon: f64,
    /// Lower bound for ε
    pub epsilon_min: f64,
    /// Multiplicative ε decay applied at the end of each episode
    pub epsilon_decay: f64,
    /// |Q| above which a weight delta is suggested
    pub delta_threshold: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.3,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            delta_threshold: 0.5,
        }
    }
}

/// A suggested adjustment for the relation `origin → destination`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDelta {
    pub origin: String,
    pub destination: String,
    pub delta: f64,
}

// ============================================================================
// Learner
// ============================================================================

#[derive(Debug, Clone)]
pub struct QLearner {
    config: LearningConfig,
    table: HashMap<(String, String), f64>,
    epsilon: f64,
    episodes: u64,
    rng: ChaCha8Rng,
}

impl QLearner {
    /// Start ε at `config.epsilon`, raised to the floor and capped at 1.
    /// Out-of-range or NaN bounds from YAML never panic.
    pub fn new(config: LearningConfig, seed: u64) -> Self {
        Self {
            epsilon: config.epsilon.max(config.epsilon_min).min(1.0),
            config,
            table: HashMap::new(),
            episodes: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Current exploration probability.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    /// Number of stored (non-default) entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Q(origin, destination), 0.0 when absent.
    pub fn q_value(&self, origin: &str, destination: &str) -> f64 {
        self.table
            .get(&(origin.to_string(), destination.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    /// ε-greedy choice among `candidates`.
    ///
    /// Exploits by picking uniformly among every candidate sharing the maximal
    /// Q value. Returns `None` only when `candidates` is empty.
    pub fn select_action(&mut self, origin: &str, candidates: &[String]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        if self.rng.gen::<f64>() < self.epsilon {
            return candidates.choose(&mut self.rng).cloned();
        }

        let scored: Vec<(&String, f64)> = candidates
            .iter()
            .map(|c| (c, self.q_value(origin, c)))
            .collect();
        let best = scored
            .iter()
            .map(|(_, q)| *q)
            .fold(f64::NEG_INFINITY, f64::max);
        let maximal: Vec<&String> = scored
            .into_iter()
            .filter(|(_, q)| *q == best)
            .map(|(c, _)| c)
            .collect();
        maximal.choose(&mut self.rng).map(|c| (*c).clone())
    }

    /// Temporal-difference update of Q(origin, destination).
    ///
    /// The bootstrap term is `γ · max_c Q(destination, c)` over
    /// `next_candidates`, 0 when there are none.
    pub fn update(
        &mut self,
        origin: &str,
        destination: &str,
        reward: f64,
        next_candidates: &[String],
    ) -> f64 {
        let future = next_candidates
            .iter()
            .map(|c| self.q_value(destination, c))
            .fold(None, |acc: Option<f64>, q| Some(acc.map_or(q, |a| a.max(q))))
            .unwrap_or(0.0);

        let current = self.q_value(origin, destination);
        let updated =
            current + self.config.alpha * (reward + self.config.gamma * future - current);
        self.table
            .insert((origin.to_string(), destination.to_string()), updated);

        debug!(origin, destination, reward, q = updated, "q-value updated");
        updated
    }

    /// Close an episode: decay ε towards its floor.
    pub fn end_episode(&mut self) -> f64 {
        self.episodes += 1;
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        self.epsilon
    }

    /// Weight adjustments for every entry with |Q| > `threshold`:
    /// `0.05 · sign(Q) · min(|Q|, 1)`. Sorted by origin then destination.
    pub fn suggest_weight_deltas(&self, threshold: f64) -> Vec<WeightDelta> {
        let mut deltas: Vec<WeightDelta> = self
            .table
            .iter()
            .filter(|(_, q)| q.abs() > threshold)
            .map(|((origin, destination), q)| WeightDelta {
                origin: origin.clone(),
                destination: destination.clone(),
                delta: DELTA_SCALE * q.signum() * q.abs().min(1.0),
            })
            .collect();
        deltas.sort_by(|a, b| {
            a.origin
                .cmp(&b.origin)
                .then_with(|| a.destination.cmp(&b.destination))
        });
        deltas
    }
}
