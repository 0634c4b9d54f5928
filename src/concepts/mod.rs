//! Concept graph store
//!
//! Fixed-dimension feature vectors per concept, an append-only
//! `name → slot` index, and weighted relations kept in sync between an
//! adjacency list and a dense weight matrix.
//!
//! ## Modules
//!
//! - [`models`] — Concept, Relation, category enum and the snapshot dump
//! - [`vectors`] — doubling weight matrix / vector bank and cosine helpers
//! - [`store`] — `ConceptStore` with add, relate and nearest-neighbour search

pub mod models;
pub mod store;
pub mod vectors;

pub use models::{Concept, ConceptCategory, ConceptRecord, GraphSnapshot, Relation};
pub use store::{ConceptStore, StoreConfig};
