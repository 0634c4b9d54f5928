//! Graph analytics over the concept store.
//!
//! Projects the store into a petgraph `DiGraph` and computes the structural
//! signals the curiosity phase feeds on: betweenness centrality (bridges),
//! degree centrality (hubs) and per-category connectivity (knowledge gaps).
//!
//! ```text
//! ConceptStore ──► ConceptGraph (petgraph::DiGraph) ──► algorithms ──► GraphMetrics
//! ```
//!
//! ## Modules
//!
//! - [`models`] — ConceptGraph, CategoryStats, GraphMetrics
//! - [`algorithms`] — Betweenness (rustworkx-core), degree centrality, category connectivity

pub mod algorithms;
pub mod models;

pub use algorithms::{
    betweenness_centrality, category_connectivity, compute_metrics, degree_centrality,
};
pub use models::{CategoryStats, ConceptGraph, GraphMetrics};
