//! Records produced by one cognition cycle.
//!
//! A cycle yields a [`Candidate`] (curiosity), an [`Exploration`], a
//! [`Reflection`] and an [`Integration`]; together they form the
//! [`DiaryEntry`] handed to the journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::neurons::ActivationSnapshot;

// ============================================================================
// Curiosity
// ============================================================================

/// Heuristic that proposed a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuriosityKind {
    /// Least-connected member of an under-connected category
    KnowledgeGap,
    /// Concept whose recent activations are dropping
    DecliningTrend,
    /// High betweenness centrality
    Bridge,
    /// Central but idle for a while
    HighPotential,
    Random,
    /// Nothing to explore (empty graph)
    Idle,
}

impl CuriosityKind {
    pub const ALL: [CuriosityKind; 6] = [
        CuriosityKind::KnowledgeGap,
        CuriosityKind::DecliningTrend,
        CuriosityKind::Bridge,
        CuriosityKind::HighPotential,
        CuriosityKind::Random,
        CuriosityKind::Idle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KnowledgeGap => "knowledge_gap",
            Self::DecliningTrend => "declining_trend",
            Self::Bridge => "bridge",
            Self::HighPotential => "high_potential",
            Self::Random => "random",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for CuriosityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concept proposed for exploration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub kind: CuriosityKind,
    /// `None` only for the idle sentinel
    pub concept: Option<String>,
    pub priority: f64,
    pub reason: String,
}

impl Candidate {
    pub fn new(
        kind: CuriosityKind,
        concept: impl Into<String>,
        priority: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            concept: Some(concept.into()),
            priority,
            reason: reason.into(),
        }
    }

    /// Sentinel returned when there is nothing to explore.
    pub fn idle() -> Self {
        Self {
            kind: CuriosityKind::Idle,
            concept: None,
            priority: 0.0,
            reason: "graph is empty".to_string(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.concept.is_none()
    }
}

// ============================================================================
// Exploration
// ============================================================================

/// Outcome of the EXPLORE phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    pub seed: Option<String>,
    /// Propagation steps actually recorded (excluding the seed snapshot)
    pub steps: usize,
    pub refine_iterations: usize,
    pub converged: bool,
    /// 0.0–1.0
    pub coherence: f64,
    /// Co-active cross-category pairs with no or a weak relation
    pub new_connections: Vec<(String, String)>,
    /// Most activated concepts after refinement
    pub top_activations: Vec<(String, f64)>,
    /// Final activation state, kept in memory only
    #[serde(skip)]
    pub final_snapshot: Option<ActivationSnapshot>,
}

impl Exploration {
    /// Neutral result: zero coherence, no connections, not converged.
    pub fn empty(seed: Option<String>) -> Self {
        Self {
            seed,
            steps: 0,
            refine_iterations: 0,
            converged: false,
            coherence: 0.0,
            new_connections: Vec::new(),
            top_activations: Vec::new(),
            final_snapshot: None,
        }
    }
}

// ============================================================================
// Reflection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Revealing,
    Interesting,
    Routine,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::Revealing
        } else if score > 0.4 {
            Self::Interesting
        } else {
            Self::Routine
        }
    }

    /// Multiplier applied to the base rest interval.
    pub fn rest_multiplier(&self) -> f64 {
        match self {
            Self::Revealing => 0.5,
            Self::Interesting => 1.0,
            Self::Routine => 2.0,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revealing => write!(f, "revealing"),
            Self::Interesting => write!(f, "interesting"),
            Self::Routine => write!(f, "routine"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub novelty: f64,
    pub coherence: f64,
    pub converged: bool,
    pub score: f64,
    pub verdict: Verdict,
}

// ============================================================================
// Integration
// ============================================================================

/// Result of the periodic consolidation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consolidation {
    pub cache_removed: usize,
    pub deltas_applied: usize,
}

/// Actions taken during INTEGRATE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    /// Relations reinforced or created by the Hebbian modifier
    pub hebbian_modifications: usize,
    /// Whether the concept-creation collaborator accepted a novelty report
    pub creation_requested: bool,
    pub reward: f64,
    /// Q-value of (origin, explored concept) after the update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_value: Option<f64>,
    pub epsilon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidation: Option<Consolidation>,
}

// ============================================================================
// Diary
// ============================================================================

/// One durable record per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Identifies one loop instance across its entries
    pub run_id: Uuid,
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub candidate: Candidate,
    pub exploration: Exploration,
    pub reflection: Reflection,
    pub integration: Integration,
    /// Rest scheduled after this cycle
    pub rest_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_score(0.71), Verdict::Revealing);
        assert_eq!(Verdict::from_score(0.7), Verdict::Interesting);
        assert_eq!(Verdict::from_score(0.41), Verdict::Interesting);
        assert_eq!(Verdict::from_score(0.4), Verdict::Routine);
        assert_eq!(Verdict::from_score(0.0), Verdict::Routine);
    }

    #[test]
    fn test_rest_multipliers() {
        assert_eq!(Verdict::Revealing.rest_multiplier(), 0.5);
        assert_eq!(Verdict::Interesting.rest_multiplier(), 1.0);
        assert_eq!(Verdict::Routine.rest_multiplier(), 2.0);
    }

    #[test]
    fn test_curiosity_kind_serde_matches_display() {
        for kind in CuriosityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_idle_candidate() {
        let idle = Candidate::idle();
        assert!(idle.is_idle());
        assert_eq!(idle.kind, CuriosityKind::Idle);
    }

    #[test]
    fn test_final_snapshot_not_serialized() {
        let mut exploration = Exploration::empty(Some("a".into()));
        exploration.final_snapshot = Some(ActivationSnapshot {
            step: 1,
            levels: vec![("a".into(), 1.0)],
        });
        let json = serde_json::to_string(&exploration).unwrap();
        assert!(!json.contains("final_snapshot"));
        let back: Exploration = serde_json::from_str(&json).unwrap();
        assert!(back.final_snapshot.is_none());
    }
}
