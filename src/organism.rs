//! The organism handle: explicit owner of every core store.
//!
//! Construction and teardown are plain lifecycle calls; there is no global
//! "current organism". Hosting layers share one instance behind
//! [`SharedOrganism`], a single coarse lock that serializes the cognition
//! loop with concurrent readers and writers.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::concepts::{ConceptCategory, ConceptStore, GraphSnapshot};
use crate::error::CoreResult;
use crate::learning::{QLearner, WeightDelta};
use crate::memory::{Clock, DecayingCache, SystemClock};
use crate::neurons::{
    ActivationSnapshot, HebbianConfig, HebbianModifier, PropagationConfig, PropagationEngine,
};
use crate::Config;

/// Shared, lock-protected organism.
pub type SharedOrganism = Arc<RwLock<Organism>>;

/// Owner of the concept store, propagation engine, Hebbian modifier,
/// Q-table and decaying cache.
#[derive(Debug)]
pub struct Organism {
    store: ConceptStore,
    propagation: PropagationEngine,
    hebbian: HebbianModifier,
    learner: QLearner,
    cache: DecayingCache<serde_json::Value>,
    last_activation: Option<ActivationSnapshot>,
}

impl Organism {
    /// Build an empty organism. Every component gets its own generator
    /// derived from `config.rng_seed`.
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let store = ConceptStore::new(config.store.clone(), config.rng_seed);
        Self::from_store(config, store, clock)
    }

    /// Wrap an existing store (e.g. one restored from a snapshot).
    pub fn from_store(config: &Config, store: ConceptStore, clock: Arc<dyn Clock>) -> Self {
        let seed = config.rng_seed;
        info!(
            concepts = store.len(),
            relations = store.relation_count(),
            seed,
            "organism initialized"
        );
        Self {
            store,
            propagation: PropagationEngine::new(config.propagation.clone(), seed.wrapping_add(1)),
            hebbian: HebbianModifier::new(config.hebbian.clone(), seed.wrapping_add(2)),
            learner: QLearner::new(config.learning.clone(), seed.wrapping_add(3)),
            cache: DecayingCache::with_clock(config.cache.clone(), clock),
            last_activation: None,
        }
    }

    pub fn from_snapshot(
        config: &Config,
        snapshot: &GraphSnapshot,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Self> {
        let store = ConceptStore::from_snapshot(snapshot, config.store.clone(), config.rng_seed)?;
        Ok(Self::from_store(config, store, clock))
    }

    /// Move into a [`SharedOrganism`].
    pub fn into_shared(self) -> SharedOrganism {
        Arc::new(RwLock::new(self))
    }

    // ------------------------------------------------------------------------
    // Graph
    // ------------------------------------------------------------------------

    pub fn add_concept(
        &mut self,
        name: &str,
        vector: Option<&[f64]>,
        category: ConceptCategory,
        uncertainty: Option<f64>,
    ) -> CoreResult<usize> {
        self.store.add_concept(name, vector, category, uncertainty)
    }

    pub fn relate(
        &mut self,
        a: &str,
        b: &str,
        weight: Option<f64>,
        bidirectional: bool,
    ) -> CoreResult<f64> {
        self.store.relate(a, b, weight, bidirectional)
    }

    /// Top-`k` concepts by cosine similarity of current vectors, self excluded.
    pub fn nearest_neighbors(&self, name: &str, k: usize) -> CoreResult<Vec<(String, f64)>> {
        self.store.nearest_neighbors(name, k)
    }

    pub fn store(&self) -> &ConceptStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConceptStore {
        &mut self.store
    }

    /// Deep copy of the graph for what-if evaluation. Mutating the copy never
    /// touches the live instance.
    pub fn sandbox(&self) -> ConceptStore {
        self.store.clone()
    }

    // ------------------------------------------------------------------------
    // Propagation & Hebbian
    // ------------------------------------------------------------------------

    /// Propagate from `seed`; the final snapshot is remembered for
    /// [`Organism::reinforce`]. Unknown seeds yield an empty result.
    pub fn activate(
        &mut self,
        seed: &str,
        steps: usize,
        temperature: f64,
    ) -> Vec<ActivationSnapshot> {
        let snapshots = self
            .propagation
            .activate(&mut self.store, seed, steps, temperature);
        self.last_activation = snapshots.last().cloned();
        snapshots
    }

    pub fn propagation_config(&self) -> &PropagationConfig {
        self.propagation.config()
    }

    pub fn hebbian_config(&self) -> &HebbianConfig {
        self.hebbian.config()
    }

    /// Run one further propagation step over a slot-indexed activation vector.
    pub fn propagate_step(&mut self, activation: &mut [f64], temperature: f64) {
        self.propagation
            .step(&mut self.store, activation, temperature);
    }

    /// Replace the remembered final snapshot (used after refinement).
    pub fn set_last_activation(&mut self, snapshot: ActivationSnapshot) {
        self.last_activation = Some(snapshot);
    }

    pub fn last_activation(&self) -> Option<&ActivationSnapshot> {
        self.last_activation.as_ref()
    }

    /// Hebbian reinforcement over the final snapshot of the latest
    /// propagation. Returns 0 when nothing has been propagated yet.
    pub fn reinforce(&mut self, rate: f64) -> usize {
        match &self.last_activation {
            Some(snapshot) => self.hebbian.reinforce(&mut self.store, snapshot, rate),
            None => 0,
        }
    }

    // ------------------------------------------------------------------------
    // Q-learning
    // ------------------------------------------------------------------------

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }

    pub fn learner_mut(&mut self) -> &mut QLearner {
        &mut self.learner
    }

    /// Add each delta to the stored relation `origin → destination` (and the
    /// mirrored direction when present), clamped to [0, 1]. Deltas whose
    /// relation does not exist are skipped. Returns how many were applied.
    pub fn apply_weight_deltas(&mut self, deltas: &[WeightDelta]) -> usize {
        let mut applied = 0;
        for d in deltas {
            let (Some(from), Some(to)) = (self.store.slot(&d.origin), self.store.slot(&d.destination))
            else {
                continue;
            };
            let Some(weight) = self.store.edge_weight_by_slot(from, to) else {
                continue;
            };
            let updated = (weight + d.delta).clamp(0.0, 1.0);
            self.store.write_edge(from, to, updated);
            if self.store.edge_weight_by_slot(to, from).is_some() {
                self.store.write_edge(to, from, updated);
            }
            applied += 1;
        }
        if applied > 0 {
            debug!(applied, suggested = deltas.len(), "q-learning deltas applied");
        }
        applied
    }

    // ------------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------------

    pub fn cache(&self) -> &DecayingCache<serde_json::Value> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut DecayingCache<serde_json::Value> {
        &mut self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::WeightDelta;

    fn organism() -> Organism {
        let mut config = Config::default();
        config.store.dimensions = 3;
        config.store.default_uncertainty = 0.0;
        Organism::new(&config)
    }

    #[test]
    fn test_reinforce_without_activation_is_noop() {
        let mut org = organism();
        org.add_concept("a", None, ConceptCategory::Idea, None).unwrap();
        assert_eq!(org.reinforce(1.0), 0);
    }

    #[test]
    fn test_reinforce_uses_last_activation() {
        let mut org = organism();
        org.add_concept("a", Some(&[1.0, 0.0, 0.0]), ConceptCategory::Idea, None)
            .unwrap();
        org.add_concept("b", Some(&[0.0, 1.0, 0.0]), ConceptCategory::Idea, None)
            .unwrap();
        org.relate("a", "b", Some(0.9), true).unwrap();
        org.activate("a", 1, 0.0);
        // a ≈ 0.53, b ≈ 0.47, both co-active
        assert_eq!(org.reinforce(0.5), 1);
        assert_eq!(
            org.store().edge_weight("a", "b"),
            org.store().edge_weight("b", "a")
        );
    }

    #[test]
    fn test_unknown_seed_clears_last_activation() {
        let mut org = organism();
        org.add_concept("a", None, ConceptCategory::Idea, None).unwrap();
        org.activate("a", 1, 0.0);
        assert!(org.last_activation().is_some());
        assert!(org.activate("ghost", 1, 0.0).is_empty());
        assert!(org.last_activation().is_none());
    }

    #[test]
    fn test_apply_weight_deltas() {
        let mut org = organism();
        for n in ["a", "b", "c"] {
            org.add_concept(n, None, ConceptCategory::Idea, None).unwrap();
        }
        org.relate("a", "b", Some(0.5), true).unwrap();
        org.relate("b", "c", Some(0.98), false).unwrap();

        let applied = org.apply_weight_deltas(&[
            WeightDelta {
                origin: "a".into(),
                destination: "b".into(),
                delta: 0.05,
            },
            WeightDelta {
                origin: "b".into(),
                destination: "c".into(),
                delta: 0.05,
            },
            WeightDelta {
                origin: "a".into(),
                destination: "c".into(),
                delta: -0.05,
            },
        ]);
        assert_eq!(applied, 2);
        assert!((org.store().edge_weight("a", "b").unwrap() - 0.55).abs() < 1e-12);
        assert!((org.store().edge_weight("b", "a").unwrap() - 0.55).abs() < 1e-12);
        assert_eq!(org.store().edge_weight("b", "c"), Some(1.0));
        assert_eq!(org.store().edge_weight("a", "c"), None);
    }

    #[test]
    fn test_sandbox_does_not_touch_live_graph() {
        let mut org = organism();
        org.add_concept("a", None, ConceptCategory::Idea, None).unwrap();
        org.add_concept("b", None, ConceptCategory::Idea, None).unwrap();
        let mut sandbox = org.sandbox();
        sandbox.relate("a", "b", Some(1.0), true).unwrap();
        sandbox
            .add_concept("c", None, ConceptCategory::Idea, None)
            .unwrap();
        assert_eq!(org.store().len(), 2);
        assert_eq!(org.store().relation_count(), 0);
    }

    #[test]
    fn test_nearest_neighbors_delegates() {
        let mut org = organism();
        org.add_concept("x", Some(&[1.0, 0.0, 0.0]), ConceptCategory::Idea, None)
            .unwrap();
        org.add_concept("near", Some(&[0.9, 0.1, 0.0]), ConceptCategory::Idea, None)
            .unwrap();
        org.add_concept("far", Some(&[0.0, 0.0, 1.0]), ConceptCategory::Idea, None)
            .unwrap();
        let nn = org.nearest_neighbors("x", 1).unwrap();
        assert_eq!(nn[0].0, "near");
        assert!(org.nearest_neighbors("ghost", 1).is_err());
    }

    #[test]
    fn test_cache_exposed() {
        let mut org = organism();
        org.cache_mut()
            .store("episode:a", serde_json::json!({"score": 0.8}), 0.9);
        assert_eq!(
            org.cache_mut().retrieve("episode:a"),
            Some(serde_json::json!({"score": 0.8}))
        );
    }
}
