//! Activation propagation engine
//!
//! Spreads activation from a seed concept over the dense weight matrix:
//! 1. **Sources**: every concept above the active threshold
//! 2. **Proposals**: `a[i] × w[i][j] × U(1-T, 1+T)` per cell
//! 3. **Aggregation**: max over sources and the previous value (never sum)
//! 4. **Normalization**: divide by the total (+ε)
//! 5. **Noise**: N(0, T/2) per entry, clipped to [0, 1]
//!
//! Max aggregation followed by sum normalization and then noise/clip means a
//! snapshot does not necessarily sum to 1. This is kept as is because the
//! learned weight dynamics depend on it.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::PropagationConfig;
use crate::concepts::vectors::EPSILON;
use crate::concepts::ConceptStore;

// ============================================================================
// Result types
// ============================================================================

/// Activation of every concept after one propagation step, in slot order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationSnapshot {
    /// 0 for the seed snapshot, then 1..=steps
    pub step: usize,
    pub levels: Vec<(String, f64)>,
}

impl ActivationSnapshot {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.levels.iter().find(|(n, _)| n == name).map(|(_, a)| *a)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Mean activation over all concepts (0 for an empty snapshot).
    pub fn mean(&self) -> f64 {
        if self.levels.is_empty() {
            return 0.0;
        }
        self.levels.iter().map(|(_, a)| a).sum::<f64>() / self.levels.len() as f64
    }

    /// Concepts strictly above `threshold`, in slot order.
    pub fn above(&self, threshold: f64) -> Vec<(&str, f64)> {
        self.levels
            .iter()
            .filter(|(_, a)| *a > threshold)
            .map(|(n, a)| (n.as_str(), *a))
            .collect()
    }

    /// The `k` most activated concepts, descending.
    pub fn top(&self, k: usize) -> Vec<(String, f64)> {
        let mut sorted = self.levels.clone();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        sorted.truncate(k);
        sorted
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Vectorized activation propagation.
///
/// Owns its own seeded generator so that noise draws are reproducible
/// independently of the store's generator.
#[derive(Debug, Clone)]
pub struct PropagationEngine {
    config: PropagationConfig,
    rng: ChaCha8Rng,
}

impl PropagationEngine {
    pub fn new(config: PropagationConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Spread activation from `seed` for `steps` steps.
    ///
    /// Returns `steps + 1` snapshots (the seed snapshot first). An unknown
    /// seed yields an empty result: there is simply nothing to explore.
    pub fn activate(
        &mut self,
        store: &mut ConceptStore,
        seed: &str,
        steps: usize,
        temperature: f64,
    ) -> Vec<ActivationSnapshot> {
        let Some(seed_slot) = store.slot(seed) else {
            debug!(seed, "activation seed not found, nothing to propagate");
            return vec![];
        };

        let mut activation = vec![0.0; store.len()];
        activation[seed_slot] = 1.0;

        let mut snapshots = Vec::with_capacity(steps + 1);
        snapshots.push(Self::snapshot(store, 0, &activation));

        for step in 1..=steps {
            self.step(store, &mut activation, temperature);
            snapshots.push(Self::snapshot(store, step, &activation));
        }

        debug!(
            seed,
            steps,
            temperature,
            active = activation
                .iter()
                .filter(|a| **a > self.config.record_threshold)
                .count(),
            "propagation finished"
        );
        snapshots
    }

    /// Advance `activation` (indexed by slot) by a single step in place.
    pub fn step(&mut self, store: &mut ConceptStore, activation: &mut [f64], temperature: f64) {
        let n = activation.len().min(store.len());
        let temperature = temperature.clamp(0.0, 1.0);

        let active: Vec<usize> = (0..n)
            .filter(|&i| activation[i] > self.config.active_threshold)
            .collect();
        if active.is_empty() {
            return;
        }

        // Max aggregation over all active sources
        let mut next = activation[..n].to_vec();
        for &i in &active {
            let source = activation[i];
            let row = store.weight_row(i);
            for (j, &w) in row.iter().enumerate().take(n) {
                if w <= 0.0 {
                    continue;
                }
                let cell_noise = if temperature > 0.0 {
                    self.rng.gen_range(1.0 - temperature..=1.0 + temperature)
                } else {
                    1.0
                };
                let proposal = source * w * cell_noise;
                if proposal > next[j] {
                    next[j] = proposal;
                }
            }
        }

        let total: f64 = next.iter().sum::<f64>() + EPSILON;
        let sigma = temperature * 0.5;
        for (j, value) in next.iter().enumerate() {
            let mut a = value / total;
            if sigma > 0.0 {
                let n: f64 = StandardNormal.sample(&mut self.rng);
                a += n * sigma;
            }
            activation[j] = a.clamp(0.0, 1.0);
        }

        for (slot, a) in activation.iter().enumerate().take(n) {
            if *a > self.config.record_threshold {
                store.record_activation(slot);
            }
        }
    }

    fn snapshot(store: &ConceptStore, step: usize, activation: &[f64]) -> ActivationSnapshot {
        ActivationSnapshot {
            step,
            levels: store
                .concepts()
                .iter()
                .zip(activation)
                .map(|(c, a)| (c.name.clone(), *a))
                .collect(),
        }
    }
}
