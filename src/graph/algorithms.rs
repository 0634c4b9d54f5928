//! Graph analytics algorithms used by the curiosity heuristics.
//!
//! - **Betweenness centrality** — via `rustworkx_core::centrality::betweenness_centrality`
//! - **Degree centrality** — in + out degree, normalized
//! - **Category connectivity** — mean degree and least-connected member per category
//!
//! All algorithms return results keyed by concept name.

use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

use super::models::{CategoryStats, ConceptGraph, GraphMetrics};
use crate::concepts::{ConceptCategory, ConceptStore};

// ============================================================================
// Betweenness Centrality (via rustworkx-core)
// ============================================================================

/// Compute betweenness centrality for all nodes.
///
/// Uses `rustworkx_core::centrality::betweenness_centrality` with normalization.
/// Returns scores in [0, 1] range.
pub fn betweenness_centrality(graph: &ConceptGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    if g.node_count() == 0 {
        return HashMap::new();
    }

    let scores = rustworkx_core::centrality::betweenness_centrality(
        g, false, // include_endpoints
        true,  // normalized
        200,   // parallel_threshold (sequential for small graphs)
    );

    let mut result = HashMap::with_capacity(g.node_count());
    for idx in g.node_indices() {
        let score = scores[idx.index()].unwrap_or(0.0);
        result.insert(g[idx].clone(), score);
    }
    result
}

// ============================================================================
// Degree centrality
// ============================================================================

/// Normalized total degree: `(in + out) / (2 × (n − 1))`.
pub fn degree_centrality(graph: &ConceptGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return HashMap::new();
    }
    let denom = if n > 1 { 2.0 * (n - 1) as f64 } else { 1.0 };

    g.node_indices()
        .map(|idx| {
            let degree = g.neighbors_directed(idx, Direction::Outgoing).count()
                + g.neighbors_directed(idx, Direction::Incoming).count();
            (g[idx].clone(), (degree as f64 / denom).min(1.0))
        })
        .collect()
}

/// Betweenness and degree centrality combined per concept.
pub fn compute_metrics(graph: &ConceptGraph) -> HashMap<String, GraphMetrics> {
    let betweenness = betweenness_centrality(graph);
    let degree = degree_centrality(graph);
    degree
        .into_iter()
        .map(|(id, degree_centrality)| {
            let metrics = GraphMetrics {
                betweenness: betweenness.get(&id).copied().unwrap_or(0.0),
                degree_centrality,
            };
            (id, metrics)
        })
        .collect()
}

// ============================================================================
// Category connectivity
// ============================================================================

/// Per-category member count, mean out-degree and least-connected member.
/// Categories are returned in their natural order.
pub fn category_connectivity(store: &ConceptStore) -> Vec<CategoryStats> {
    let mut groups: BTreeMap<ConceptCategory, Vec<usize>> = BTreeMap::new();
    for concept in store.concepts() {
        groups
            .entry(concept.category.clone())
            .or_default()
            .push(concept.slot);
    }

    groups
        .into_iter()
        .filter_map(|(category, slots)| {
            let degrees: Vec<(usize, usize)> =
                slots.iter().map(|&s| (s, store.degree(s))).collect();
            let total: usize = degrees.iter().map(|(_, d)| d).sum();
            let (least_slot, _) = degrees
                .iter()
                .copied()
                .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))?;
            Some(CategoryStats {
                members: slots.len(),
                mean_degree: total as f64 / slots.len() as f64,
                least_connected: store.concept_at(least_slot).name.clone(),
                category,
            })
        })
        .collect()
}
