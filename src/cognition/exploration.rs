//! EXPLORE phase: propagate from the chosen concept, refine until the
//! activation settles, then measure what came up.

use tracing::debug;

use super::config::CognitionConfig;
use super::types::Exploration;
use crate::neurons::ActivationSnapshot;
use crate::organism::Organism;

/// Concepts counted when measuring how focused the activation is.
const FOCUS_TOP_K: usize = 3;
const FOCUS_WEIGHT: f64 = 0.6;
const COHESION_WEIGHT: f64 = 0.4;
const TOP_ACTIVATIONS: usize = 5;

/// Explore from `seed`. An unknown seed yields [`Exploration::empty`].
///
/// The final activation state becomes the organism's last activation, so a
/// subsequent Hebbian pass works on the refined result.
pub fn explore(organism: &mut Organism, seed: &str, config: &CognitionConfig) -> Exploration {
    let (explore_steps, temperature) = {
        let propagation = organism.propagation_config();
        (propagation.default_steps, propagation.default_temperature)
    };
    let snapshots = organism.activate(seed, explore_steps, temperature);
    let Some(last) = snapshots.last() else {
        debug!(seed, "Nothing to explore");
        return Exploration::empty(Some(seed.to_string()));
    };
    let steps = last.step;

    // Levels are in slot order, so the vector index is the slot.
    let names: Vec<String> = last.levels.iter().map(|(n, _)| n.clone()).collect();
    let mut activation: Vec<f64> = last.levels.iter().map(|(_, a)| *a).collect();

    let mut converged = false;
    let mut iterations = 0;
    while iterations < config.max_refine_iterations {
        let previous = activation.clone();
        organism.propagate_step(&mut activation, config.refine_temperature);
        iterations += 1;
        if mean_abs_change(&previous, &activation) < config.convergence_tolerance {
            converged = true;
            break;
        }
    }

    let snapshot = ActivationSnapshot {
        step: steps + iterations,
        levels: names.into_iter().zip(activation).collect(),
    };
    let coherence = coherence(organism, &snapshot, config.co_activation_threshold);
    let new_connections = new_connections(organism, &snapshot, config);
    organism.set_last_activation(snapshot.clone());

    debug!(
        seed,
        steps,
        iterations,
        converged,
        coherence,
        new_connections = new_connections.len(),
        "Exploration finished"
    );

    Exploration {
        seed: Some(seed.to_string()),
        steps,
        refine_iterations: iterations,
        converged,
        coherence,
        new_connections,
        top_activations: snapshot.top(TOP_ACTIVATIONS),
        final_snapshot: Some(snapshot),
    }
}

fn mean_abs_change(before: &[f64], after: &[f64]) -> f64 {
    if before.is_empty() {
        return 0.0;
    }
    before
        .iter()
        .zip(after)
        .map(|(a, b)| (a - b).abs())
        .sum::<f64>()
        / before.len() as f64
}

/// `0.6·focus + 0.4·cohesion`, in [0, 1].
///
/// Focus is the share of total activation held by the top concepts. Cohesion
/// is the mean relation weight (strongest direction, 0 when unrelated) over
/// co-active pairs.
pub fn coherence(organism: &Organism, snapshot: &ActivationSnapshot, threshold: f64) -> f64 {
    let total: f64 = snapshot.levels.iter().map(|(_, a)| a).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let focus = snapshot
        .top(FOCUS_TOP_K)
        .iter()
        .map(|(_, a)| a)
        .sum::<f64>()
        / total;

    let active = snapshot.above(threshold);
    let mut pairs = 0usize;
    let mut weight_sum = 0.0;
    for (i, (a, _)) in active.iter().enumerate() {
        for (b, _) in &active[i + 1..] {
            pairs += 1;
            weight_sum += strongest_weight(organism, a, b).unwrap_or(0.0);
        }
    }
    let cohesion = if pairs == 0 {
        0.0
    } else {
        weight_sum / pairs as f64
    };

    (FOCUS_WEIGHT * focus + COHESION_WEIGHT * cohesion).clamp(0.0, 1.0)
}

/// Co-active pairs from different categories with no or a weak relation.
pub fn new_connections(
    organism: &Organism,
    snapshot: &ActivationSnapshot,
    config: &CognitionConfig,
) -> Vec<(String, String)> {
    let store = organism.store();
    let active = snapshot.above(config.co_activation_threshold);
    let mut found = Vec::new();
    for (i, (a, _)) in active.iter().enumerate() {
        for (b, _) in &active[i + 1..] {
            let (Some(ca), Some(cb)) = (store.concept(a), store.concept(b)) else {
                continue;
            };
            if ca.category == cb.category {
                continue;
            }
            let weak = strongest_weight(organism, a, b)
                .map_or(true, |w| w < config.weak_edge_threshold);
            if weak {
                found.push((a.to_string(), b.to_string()));
            }
        }
    }
    found
}

fn strongest_weight(organism: &Organism, a: &str, b: &str) -> Option<f64> {
    let store = organism.store();
    match (store.edge_weight(a, b), store.edge_weight(b, a)) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    }
}
