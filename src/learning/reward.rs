//! Reward signal for a single exploration episode.

use crate::neurons::ActivationSnapshot;

/// Number of useful concepts at which utility peaks.
const IDEAL_USEFUL_COUNT: f64 = 5.0;
const EMPTY_PENALTY: f64 = -0.5;
const QUIET_PENALTY: f64 = -0.3;
const QUIET_MEAN_ACTIVATION: f64 = 0.05;

/// Score an episode in [-1, 1].
///
/// `utility = 1 − |useful − 5| / 5`, plus `diversity × 0.5`, minus 0.5 for
/// an empty snapshot or 0.3 when the mean activation is below 0.05.
pub fn compute_reward(snapshot: &ActivationSnapshot, useful_count: usize, diversity: f64) -> f64 {
    let utility = 1.0 - (useful_count as f64 - IDEAL_USEFUL_COUNT).abs() / IDEAL_USEFUL_COUNT;
    let diversity_bonus = if diversity.is_finite() {
        diversity * 0.5
    } else {
        0.0
    };
    let penalty = if snapshot.is_empty() {
        EMPTY_PENALTY
    } else if snapshot.mean() < QUIET_MEAN_ACTIVATION {
        QUIET_PENALTY
    } else {
        0.0
    };
    (utility + diversity_bonus + penalty).clamp(-1.0, 1.0)
}
