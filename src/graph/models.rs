//! Graph analytics data models.
//!
//! - [`ConceptGraph`] — petgraph projection of the concept store with an
//!   ID ↔ NodeIndex mapping
//! - [`CategoryStats`] — connectivity summary for one concept category
//! - [`GraphMetrics`] — per-concept centrality scores

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::concepts::{ConceptCategory, ConceptStore};

// ============================================================================
// ConceptGraph — petgraph wrapper with ID mapping
// ============================================================================

/// Wrapper around `petgraph::DiGraph` with concept-name → NodeIndex lookup.
///
/// Node indices follow store slots, so `graph[NodeIndex::new(slot)]` is the
/// concept stored at `slot`. Edge weights are relation weights.
#[derive(Debug, Clone)]
pub struct ConceptGraph {
    /// The underlying directed graph (node weight = concept name)
    pub graph: DiGraph<String, f64>,
    /// Mapping from concept name to petgraph NodeIndex
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl ConceptGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Project every concept and relation of the store.
    pub fn from_store(store: &ConceptStore) -> Self {
        let mut cg = Self {
            graph: DiGraph::with_capacity(store.len(), store.relation_count()),
            id_to_index: HashMap::with_capacity(store.len()),
        };
        for concept in store.concepts() {
            let idx = cg.graph.add_node(concept.name.clone());
            cg.id_to_index.insert(concept.name.clone(), idx);
        }
        for concept in store.concepts() {
            let from = NodeIndex::new(concept.slot);
            for target in store.neighbor_slots(concept.slot) {
                let weight = store
                    .edge_weight_by_slot(concept.slot, target)
                    .unwrap_or(0.0);
                cg.graph.add_edge(from, NodeIndex::new(target), weight);
            }
        }
        cg
    }

    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for ConceptGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Output types
// ============================================================================

/// Connectivity of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: ConceptCategory,
    pub members: usize,
    /// Mean out-degree of the members
    pub mean_degree: f64,
    /// Member with the fewest relations (first in slot order on ties)
    pub least_connected: String,
}

/// Centrality scores for one concept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetrics {
    /// Normalized betweenness centrality (0.0–1.0)
    pub betweenness: f64,
    /// (in + out degree) / (2 × (n − 1))
    pub degree_centrality: f64,
}
