//! REFLECT phase: score an exploration.

use super::types::{Exploration, Reflection, Verdict};

/// New connections at which novelty saturates.
const NOVELTY_SATURATION: f64 = 3.0;

/// `score = 0.3·novelty + 0.4·coherence + 0.3·[converged]`, clipped to [0, 1].
pub fn reflect(exploration: &Exploration) -> Reflection {
    let novelty = (exploration.new_connections.len() as f64 / NOVELTY_SATURATION).min(1.0);
    let convergence = if exploration.converged { 0.3 } else { 0.0 };
    let score = (0.3 * novelty + 0.4 * exploration.coherence + convergence).clamp(0.0, 1.0);
    Reflection {
        novelty,
        coherence: exploration.coherence,
        converged: exploration.converged,
        score,
        verdict: Verdict::from_score(score),
    }
}
