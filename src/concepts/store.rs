//! The concept store: vectors, relations and the slot index.
//!
//! Relations are stored twice: an insertion-ordered adjacency list per
//! source (for API and narrative consumers) and a dense slot-indexed weight
//! matrix (for vectorized propagation). Every write goes through
//! [`ConceptStore::write_edge`], which updates both.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::models::{Concept, ConceptCategory, ConceptRecord, GraphSnapshot, Relation};
use super::vectors::{cosine_similarity, normalized, VectorBank, WeightMatrix};
use crate::error::{CoreError, CoreResult};

/// Standard deviation of the jitter added to a similarity-derived weight.
const RELATE_JITTER_SIGMA: f64 = 0.1;
/// Clip range for similarity-derived weights.
const MIN_DEFAULT_WEIGHT: f64 = 0.1;
const MAX_DEFAULT_WEIGHT: f64 = 1.0;
/// Allowed range of the externally adjusted concept strength.
const MAX_STRENGTH: f64 = 2.0;

// ============================================================================
// Configuration
// ============================================================================

/// Tuning for the concept store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Dimensionality of every feature vector.
    pub dimensions: usize,
    /// Standard deviation of the Gaussian noise added on insert when the
    /// caller gives no explicit uncertainty.
    pub default_uncertainty: f64,
    /// Initial slot capacity of the dense buffers (doubles on demand).
    pub initial_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dimensions: 32,
            default_uncertainty: 0.05,
            initial_capacity: 16,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Edge {
    target: usize,
    weight: f64,
}

/// Owner of every concept, vector and relation.
///
/// `Clone` produces a fully independent deep copy, used for sandboxed
/// what-if evaluation.
#[derive(Debug, Clone)]
pub struct ConceptStore {
    config: StoreConfig,
    concepts: Vec<Concept>,
    index: HashMap<String, usize>,
    base_vectors: VectorBank,
    current_vectors: VectorBank,
    weights: WeightMatrix,
    adjacency: Vec<Vec<Edge>>,
    cycle: u64,
    rng: ChaCha8Rng,
}

impl ConceptStore {
    /// Create an empty store whose random draws derive from `seed`.
    pub fn new(config: StoreConfig, seed: u64) -> Self {
        let capacity = config.initial_capacity.max(1);
        Self {
            base_vectors: VectorBank::with_capacity(config.dimensions, capacity),
            current_vectors: VectorBank::with_capacity(config.dimensions, capacity),
            weights: WeightMatrix::with_capacity(capacity),
            concepts: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            adjacency: Vec::with_capacity(capacity),
            cycle: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Number of concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Current slot capacity of the dense buffers.
    pub fn capacity(&self) -> usize {
        self.weights.capacity()
    }

    /// Global cycle counter stamped onto activated concepts.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Register a new concept and return its slot.
    ///
    /// The supplied (or randomly drawn) vector is unit-normalized and kept as
    /// the base vector; the current vector adds independent Gaussian noise
    /// with σ = `uncertainty` (or the configured default).
    pub fn add_concept(
        &mut self,
        name: &str,
        vector: Option<&[f64]>,
        category: ConceptCategory,
        uncertainty: Option<f64>,
    ) -> CoreResult<usize> {
        if self.index.contains_key(name) {
            return Err(CoreError::Duplicate(name.to_string()));
        }
        let dims = self.config.dimensions;
        let base = match vector {
            Some(v) if v.len() != dims => {
                return Err(CoreError::Validation {
                    expected: dims,
                    actual: v.len(),
                })
            }
            Some(v) => normalized(v),
            None => {
                let raw: Vec<f64> = (0..dims)
                    .map(|_| StandardNormal.sample(&mut self.rng))
                    .collect();
                normalized(&raw)
            }
        };

        let sigma = uncertainty.unwrap_or(self.config.default_uncertainty).max(0.0);
        let current: Vec<f64> = base
            .iter()
            .map(|x| {
                let n: f64 = StandardNormal.sample(&mut self.rng);
                x + n * sigma
            })
            .collect();

        let slot = self.concepts.len();
        self.ensure_capacity(slot + 1);
        self.base_vectors.set_row(slot, &base);
        self.current_vectors.set_row(slot, &current);
        self.adjacency.push(Vec::new());
        self.index.insert(name.to_string(), slot);
        self.concepts.push(Concept {
            name: name.to_string(),
            slot,
            strength: 1.0,
            activation_count: 0,
            last_active_cycle: None,
            category,
            created_at_cycle: self.cycle,
        });

        debug!(concept = name, slot, "concept added");
        Ok(slot)
    }

    fn ensure_capacity(&mut self, slots: usize) {
        if slots > self.weights.capacity() {
            debug!(
                from = self.weights.capacity(),
                needed = slots,
                "growing concept buffers"
            );
        }
        self.weights.ensure_capacity(slots);
        self.base_vectors.ensure_capacity(slots);
        self.current_vectors.ensure_capacity(slots);
    }

    // ------------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------------

    /// Create or overwrite the relation `a → b` (and `b → a` when
    /// `bidirectional`). Returns the weight that was applied. Explicit
    /// weights are clipped to [0, 1]; a non-finite weight is stored as 0.
    ///
    /// Without an explicit weight the cosine similarity of the two current
    /// vectors is jittered with N(0, 0.1) and clipped to [0.1, 1.0].
    pub fn relate(
        &mut self,
        a: &str,
        b: &str,
        weight: Option<f64>,
        bidirectional: bool,
    ) -> CoreResult<f64> {
        let from = self.require_slot(a)?;
        let to = self.require_slot(b)?;

        let applied = match weight {
            Some(w) if w.is_finite() => w.clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => {
                let similarity = cosine_similarity(
                    self.current_vectors.row(from),
                    self.current_vectors.row(to),
                );
                let jitter: f64 = StandardNormal.sample(&mut self.rng);
                (similarity + jitter * RELATE_JITTER_SIGMA)
                    .clamp(MIN_DEFAULT_WEIGHT, MAX_DEFAULT_WEIGHT)
            }
        };

        self.write_edge(from, to, applied);
        if bidirectional {
            self.write_edge(to, from, applied);
        }
        Ok(applied)
    }

    /// Write `weight` to both the matrix cell and the adjacency entry.
    pub(crate) fn write_edge(&mut self, from: usize, to: usize, weight: f64) {
        let weight = weight.clamp(0.0, 1.0);
        self.weights.set(from, to, weight);
        let edges = &mut self.adjacency[from];
        match edges.iter_mut().find(|e| e.target == to) {
            Some(edge) => edge.weight = weight,
            None => edges.push(Edge { target: to, weight }),
        }
    }

    /// Weight of the stored relation `from → to`, if one exists.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        let f = self.slot(from)?;
        let t = self.slot(to)?;
        self.edge_weight_by_slot(f, t)
    }

    pub(crate) fn edge_weight_by_slot(&self, from: usize, to: usize) -> Option<f64> {
        self.adjacency[from]
            .iter()
            .find(|e| e.target == to)
            .map(|e| e.weight)
    }

    /// Outgoing relations of `name` in insertion order.
    pub fn relations(&self, name: &str) -> CoreResult<Vec<Relation>> {
        let slot = self.require_slot(name)?;
        Ok(self.relations_of(slot))
    }

    fn relations_of(&self, slot: usize) -> Vec<Relation> {
        let from = &self.concepts[slot].name;
        self.adjacency[slot]
            .iter()
            .map(|e| Relation {
                from: from.clone(),
                to: self.concepts[e.target].name.clone(),
                weight: e.weight,
            })
            .collect()
    }

    /// Every relation, grouped by source slot.
    pub fn all_relations(&self) -> Vec<Relation> {
        (0..self.concepts.len())
            .flat_map(|slot| self.relations_of(slot))
            .collect()
    }

    pub fn relation_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Out-degree of a slot.
    pub(crate) fn degree(&self, slot: usize) -> usize {
        self.adjacency[slot].len()
    }

    /// Target slots of the outgoing relations of `slot`.
    pub(crate) fn neighbor_slots(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[slot].iter().map(|e| e.target)
    }

    /// Dense outgoing weight row for propagation (length = `len()`).
    pub(crate) fn weight_row(&self, slot: usize) -> &[f64] {
        self.weights.row(slot, self.concepts.len())
    }

    // ------------------------------------------------------------------------
    // Similarity
    // ------------------------------------------------------------------------

    /// Top-k concepts by cosine similarity of current vectors, excluding
    /// `name` itself. Ties keep slot order.
    pub fn nearest_neighbors(&self, name: &str, k: usize) -> CoreResult<Vec<(String, f64)>> {
        let slot = self.require_slot(name)?;
        let query = self.current_vectors.row(slot);
        let scores = self.current_vectors.cosine_all(query, self.concepts.len());

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .collect();
        // Stable sort: equal scores stay in slot order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(i, s)| (self.concepts[i].name.clone(), s))
            .collect())
    }

    pub fn base_vector(&self, name: &str) -> Option<&[f64]> {
        self.slot(name).map(|s| self.base_vectors.row(s))
    }

    pub fn current_vector(&self, name: &str) -> Option<&[f64]> {
        self.slot(name).map(|s| self.current_vectors.row(s))
    }

    // ------------------------------------------------------------------------
    // Lookup & bookkeeping
    // ------------------------------------------------------------------------

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn require_slot(&self, name: &str) -> CoreResult<usize> {
        self.slot(name)
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.slot(name).map(|s| &self.concepts[s])
    }

    pub(crate) fn concept_at(&self, slot: usize) -> &Concept {
        &self.concepts[slot]
    }

    /// Concepts in slot order.
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn names(&self) -> Vec<String> {
        self.concepts.iter().map(|c| c.name.clone()).collect()
    }

    /// Distinct categories present in the store.
    pub fn categories(&self) -> BTreeSet<ConceptCategory> {
        self.concepts.iter().map(|c| c.category.clone()).collect()
    }

    /// Apply external feedback to a concept's strength (clamped to [0, 2]).
    pub fn adjust_strength(&mut self, name: &str, delta: f64) -> CoreResult<f64> {
        let slot = self.require_slot(name)?;
        let concept = &mut self.concepts[slot];
        concept.strength = (concept.strength + delta).clamp(0.0, MAX_STRENGTH);
        Ok(concept.strength)
    }

    /// Stamp a propagation hit onto a concept.
    pub(crate) fn record_activation(&mut self, slot: usize) {
        let cycle = self.cycle;
        let concept = &mut self.concepts[slot];
        concept.activation_count += 1;
        concept.last_active_cycle = Some(cycle);
    }

    // ------------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------------

    /// Plain dump of every concept and relation.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            dimensions: self.config.dimensions,
            cycle: self.cycle,
            concepts: self
                .concepts
                .iter()
                .map(|c| ConceptRecord {
                    name: c.name.clone(),
                    category: c.category.clone(),
                    base_vector: self.base_vectors.row(c.slot).to_vec(),
                    current_vector: self.current_vectors.row(c.slot).to_vec(),
                    strength: c.strength,
                    activation_count: c.activation_count,
                    last_active_cycle: c.last_active_cycle,
                    created_at_cycle: c.created_at_cycle,
                })
                .collect(),
            relations: self.all_relations(),
        }
    }

    /// Rebuild a store from a dump. Slots follow the dump's concept order and
    /// vectors are restored verbatim (no renormalization, no new noise).
    pub fn from_snapshot(
        snapshot: &GraphSnapshot,
        mut config: StoreConfig,
        seed: u64,
    ) -> CoreResult<Self> {
        config.dimensions = snapshot.dimensions;
        let mut store = Self::new(config, seed);
        store.cycle = snapshot.cycle;

        for record in &snapshot.concepts {
            if store.index.contains_key(&record.name) {
                return Err(CoreError::Duplicate(record.name.clone()));
            }
            for v in [&record.base_vector, &record.current_vector] {
                if v.len() != snapshot.dimensions {
                    return Err(CoreError::Validation {
                        expected: snapshot.dimensions,
                        actual: v.len(),
                    });
                }
            }
            let slot = store.concepts.len();
            store.ensure_capacity(slot + 1);
            store.base_vectors.set_row(slot, &record.base_vector);
            store.current_vectors.set_row(slot, &record.current_vector);
            store.adjacency.push(Vec::new());
            store.index.insert(record.name.clone(), slot);
            store.concepts.push(Concept {
                name: record.name.clone(),
                slot,
                strength: record.strength.clamp(0.0, MAX_STRENGTH),
                activation_count: record.activation_count,
                last_active_cycle: record.last_active_cycle,
                category: record.category.clone(),
                created_at_cycle: record.created_at_cycle,
            });
        }

        for relation in &snapshot.relations {
            let from = store.require_slot(&relation.from)?;
            let to = store.require_slot(&relation.to)?;
            store.write_edge(from, to, relation.weight);
        }
        Ok(store)
    }
}
