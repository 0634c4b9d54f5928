//! Optional collaborators consulted by the cognition loop.
//!
//! Both are held as `Option<Arc<dyn ...>>`; an absent collaborator degrades
//! to a neutral result (all adjustment factors 1.0, no creation request).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::CuriosityKind;

/// Per-heuristic priority multipliers, fed back by a meta-cognition layer.
///
/// Queried once per CURIOSITY phase. Missing kinds count as 1.0.
pub trait PriorityAdjustmentSource: Send + Sync {
    fn adjustment_factors(&self) -> HashMap<CuriosityKind, f64>;
}

/// Fixed factors, e.g. loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticAdjustments {
    factors: HashMap<CuriosityKind, f64>,
}

impl StaticAdjustments {
    pub fn new(factors: HashMap<CuriosityKind, f64>) -> Self {
        Self { factors }
    }

    pub fn with(mut self, kind: CuriosityKind, factor: f64) -> Self {
        self.factors.insert(kind, factor);
        self
    }
}

impl PriorityAdjustmentSource for StaticAdjustments {
    fn adjustment_factors(&self) -> HashMap<CuriosityKind, f64> {
        self.factors.clone()
    }
}

/// What INTEGRATE found worth turning into new concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoveltyReport {
    pub cycle: u64,
    pub seed: String,
    pub pairs: Vec<(String, String)>,
}

/// Receives novelty reports; what it does with them is up to the host.
#[async_trait]
pub trait ConceptCreationSink: Send + Sync {
    async fn on_novelty(&self, report: &NoveltyReport) -> anyhow::Result<()>;
}
