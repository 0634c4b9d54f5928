//! Cognition event types for live readers (dashboards, log tailers)

use serde::{Deserialize, Serialize};

use crate::cognition::Verdict;

/// An event emitted by the cognition loop
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CognitionEvent {
    /// A cycle finished and its diary entry was handed to the journal
    CycleCompleted {
        cycle: u64,
        /// Explored concept, `None` for the idle sentinel
        #[serde(skip_serializing_if = "Option::is_none")]
        concept: Option<String>,
        verdict: Verdict,
        score: f64,
    },
    /// The periodic consolidation pass ran
    Consolidated {
        cycle: u64,
        cache_removed: usize,
        deltas_applied: usize,
    },
}

impl CognitionEvent {
    pub fn cycle(&self) -> u64 {
        match self {
            Self::CycleCompleted { cycle, .. } | Self::Consolidated { cycle, .. } => *cycle,
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CycleCompleted { .. } => "cycle_completed",
            Self::Consolidated { .. } => "consolidated",
        }
    }
}

/// Sink for cognition events.
///
/// Implementations must never block or fail the caller.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: CognitionEvent);
}
