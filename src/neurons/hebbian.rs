//! Hebbian reinforcement — "fire together, wire together".
//!
//! Consumes the final snapshot of the latest propagation. For every
//! unordered pair of co-active concepts an existing relation is
//! strengthened, and a missing one is occasionally created with the
//! similarity-derived default weight.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::activation::ActivationSnapshot;
use super::config::HebbianConfig;
use crate::concepts::ConceptStore;

/// Post-hoc edge reinforcement.
#[derive(Debug, Clone)]
pub struct HebbianModifier {
    config: HebbianConfig,
    rng: ChaCha8Rng,
}

impl HebbianModifier {
    pub fn new(config: HebbianConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &HebbianConfig {
        &self.config
    }

    /// Reinforce co-active pairs of `snapshot` and return how many relations
    /// were strengthened or created. Never fails; a non-positive rate or fewer
    /// than two co-active concepts is a no-op.
    pub fn reinforce(
        &mut self,
        store: &mut ConceptStore,
        snapshot: &ActivationSnapshot,
        rate: f64,
    ) -> usize {
        if rate.is_nan() || rate <= 0.0 {
            return 0;
        }
        let rate = rate.min(1.0);
        let co_active: Vec<(usize, String)> = snapshot
            .above(self.config.co_activation_threshold)
            .into_iter()
            .filter_map(|(name, _)| store.slot(name).map(|slot| (slot, name.to_string())))
            .collect();
        if co_active.len() < 2 {
            return 0;
        }

        let mut modifications = 0;
        for (idx, (i, name_i)) in co_active.iter().enumerate() {
            for (j, name_j) in &co_active[idx + 1..] {
                let forward = store.edge_weight_by_slot(*i, *j);
                let backward = store.edge_weight_by_slot(*j, *i);

                if forward.is_some() || backward.is_some() {
                    let current = forward.unwrap_or(0.0).max(backward.unwrap_or(0.0));
                    let boosted = (current + rate * self.rng.gen::<f64>()).min(1.0);
                    // Mirrored pairs stay equal
                    if forward.is_some() {
                        store.write_edge(*i, *j, boosted);
                    }
                    if backward.is_some() {
                        store.write_edge(*j, *i, boosted);
                    }
                    modifications += 1;
                } else if self.rng.gen::<f64>() < rate * self.config.creation_factor {
                    if let Ok(weight) = store.relate(name_i, name_j, None, true) {
                        debug!(from = %name_i, to = %name_j, weight, "hebbian relation created");
                        modifications += 1;
                    }
                }
            }
        }

        debug!(
            co_active = co_active.len(),
            modifications, "hebbian reinforcement applied"
        );
        modifications
    }
}
