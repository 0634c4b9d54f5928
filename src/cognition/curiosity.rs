//! CURIOSITY phase: decide which concept to explore next.
//!
//! Independent heuristics each propose weighted candidates:
//!
//! | Heuristic        | Signal                                          | Base priority        |
//! |------------------|-------------------------------------------------|----------------------|
//! | Knowledge gap    | category mean degree < 2 or < ½ overall mean    | 0.6 + 0.3·severity   |
//! | Declining trend  | recent mean activation < 0.7 × older mean       | 0.5 + 0.4·drop       |
//! | Bridge           | top-2 betweenness centrality                    | 0.4 + 0.5·b          |
//! | High potential   | degree centrality × idleness, Q-learner pick    | 0.3 + 0.6·score      |
//! | Random           | fixed probability                               | 0.5                  |
//!
//! Every priority is then multiplied by the externally supplied factor for
//! its kind, jittered by U(-0.1, 0.1), floored at 0 and finally damped by
//! how recently the concept was explored (cache strength).

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use super::config::CognitionConfig;
use super::types::{Candidate, CuriosityKind};
use crate::graph::{category_connectivity, compute_metrics, ConceptGraph};
use crate::neurons::ActivationSnapshot;
use crate::organism::Organism;

const GAP_MIN_MEAN_DEGREE: f64 = 2.0;
const GAP_RELATIVE_DEGREE: f64 = 0.5;
const DECLINE_RATIO: f64 = 0.7;
const BRIDGE_COUNT: usize = 2;
const HIGH_POTENTIAL_COUNT: usize = 3;
/// Idle cycles after which idleness contributes ~63%.
const IDLE_SCALE: f64 = 10.0;
const RANDOM_PRIORITY: f64 = 0.5;
const JITTER: f64 = 0.1;
const REPETITION_PENALTY: f64 = 0.5;

/// Cache key under which an exploration of `concept` is remembered.
pub fn exploration_key(concept: &str) -> String {
    format!("explored:{concept}")
}

/// Stateful candidate selector.
///
/// Keeps a short activation history per concept for trend detection.
#[derive(Debug, Clone)]
pub struct CuriosityEngine {
    random_pick_probability: f64,
    trend_window: usize,
    history: HashMap<String, VecDeque<f64>>,
    rng: ChaCha8Rng,
}

impl CuriosityEngine {
    pub fn new(config: &CognitionConfig, seed: u64) -> Self {
        Self {
            random_pick_probability: config.random_pick_probability,
            trend_window: config.trend_window.max(2),
            history: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Record the activation of every concept in `snapshot`.
    pub fn observe(&mut self, snapshot: &ActivationSnapshot) {
        for (name, level) in &snapshot.levels {
            let window = self.history.entry(name.clone()).or_default();
            window.push_back(*level);
            while window.len() > self.trend_window {
                window.pop_front();
            }
        }
    }

    /// Gather candidates from every heuristic, without adjustment.
    pub fn gather(&mut self, organism: &mut Organism, last_concept: Option<&str>) -> Vec<Candidate> {
        let store = organism.store();
        if store.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        candidates.extend(self.knowledge_gaps(organism));
        candidates.extend(self.declining_trends(organism));

        let graph = ConceptGraph::from_store(organism.store());
        let metrics = compute_metrics(&graph);

        // Bridges: walk in slot order so equal scores keep a stable order.
        let mut bridges: Vec<(String, f64)> = organism
            .store()
            .concepts()
            .iter()
            .filter_map(|c| {
                let b = metrics.get(&c.name)?.betweenness;
                (b > 0.0).then(|| (c.name.clone(), b))
            })
            .collect();
        bridges.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (name, b) in bridges.into_iter().take(BRIDGE_COUNT) {
            candidates.push(Candidate::new(
                CuriosityKind::Bridge,
                name,
                0.4 + 0.5 * b,
                format!("betweenness {b:.3}"),
            ));
        }

        // High potential: central but idle; the Q-learner picks among the best.
        let now = organism.store().cycle();
        let mut potential: Vec<(String, f64)> = organism
            .store()
            .concepts()
            .iter()
            .filter_map(|c| {
                let degree = metrics.get(&c.name)?.degree_centrality;
                let since = c.last_active_cycle.unwrap_or(c.created_at_cycle);
                let idle = now.saturating_sub(since) as f64;
                let score = degree * (1.0 - (-idle / IDLE_SCALE).exp());
                (score > 0.0).then(|| (c.name.clone(), score))
            })
            .collect();
        potential.sort_by(|a, b| b.1.total_cmp(&a.1));
        potential.truncate(HIGH_POTENTIAL_COUNT);
        if !potential.is_empty() {
            let names: Vec<String> = potential.iter().map(|(n, _)| n.clone()).collect();
            let picked = match last_concept {
                Some(origin) => organism.learner_mut().select_action(origin, &names),
                None => None,
            }
            .unwrap_or_else(|| names[0].clone());
            if let Some((name, score)) = potential.into_iter().find(|(n, _)| *n == picked) {
                candidates.push(Candidate::new(
                    CuriosityKind::HighPotential,
                    name,
                    0.3 + 0.6 * score,
                    format!("central and idle ({score:.3})"),
                ));
            }
        }

        let names = organism.store().names();
        if self.rng.gen::<f64>() < self.random_pick_probability {
            if let Some(name) = names.choose(&mut self.rng) {
                candidates.push(Candidate::new(
                    CuriosityKind::Random,
                    name.clone(),
                    RANDOM_PRIORITY,
                    "random pick",
                ));
            }
        }

        // A non-empty graph always yields something to explore.
        if candidates.is_empty() {
            if let Some(name) = names.choose(&mut self.rng) {
                candidates.push(Candidate::new(
                    CuriosityKind::Random,
                    name.clone(),
                    RANDOM_PRIORITY,
                    "no heuristic fired",
                ));
            }
        }

        candidates
    }

    /// Run every heuristic, adjust priorities and return the best candidate.
    ///
    /// Falls back to [`Candidate::idle`] on an empty graph. Ties keep the
    /// first-seen candidate.
    pub fn select(
        &mut self,
        organism: &mut Organism,
        last_concept: Option<&str>,
        factors: &HashMap<CuriosityKind, f64>,
    ) -> Candidate {
        let mut candidates = self.gather(organism, last_concept);
        if candidates.is_empty() {
            return Candidate::idle();
        }

        for candidate in &mut candidates {
            let factor = factors.get(&candidate.kind).copied().unwrap_or(1.0);
            let jitter = self.rng.gen_range(-JITTER..=JITTER);
            let mut priority = (candidate.priority * factor + jitter).max(0.0);
            if let Some(name) = &candidate.concept {
                let recent = organism
                    .cache_mut()
                    .strength(&exploration_key(name))
                    .unwrap_or(0.0);
                priority *= 1.0 - REPETITION_PENALTY * recent;
            }
            candidate.priority = priority;
        }

        let total = candidates.len();
        let mut best = 0;
        for (i, candidate) in candidates.iter().enumerate().skip(1) {
            if candidate.priority > candidates[best].priority {
                best = i;
            }
        }
        let chosen = candidates.swap_remove(best);
        debug!(
            kind = %chosen.kind,
            concept = chosen.concept.as_deref().unwrap_or("-"),
            priority = chosen.priority,
            candidates = total,
            "Curiosity candidate selected"
        );
        chosen
    }

    // ------------------------------------------------------------------------
    // Heuristics
    // ------------------------------------------------------------------------

    fn knowledge_gaps(&self, organism: &Organism) -> Vec<Candidate> {
        let store = organism.store();
        let overall = store.relation_count() as f64 / store.len() as f64;
        category_connectivity(store)
            .into_iter()
            .filter(|stats| {
                stats.mean_degree < GAP_MIN_MEAN_DEGREE
                    || stats.mean_degree < GAP_RELATIVE_DEGREE * overall
            })
            .map(|stats| {
                let reference = overall.max(GAP_MIN_MEAN_DEGREE);
                let severity = (1.0 - stats.mean_degree / reference).clamp(0.0, 1.0);
                Candidate::new(
                    CuriosityKind::KnowledgeGap,
                    stats.least_connected,
                    0.6 + 0.3 * severity,
                    format!(
                        "category {} has mean degree {:.2}",
                        stats.category, stats.mean_degree
                    ),
                )
            })
            .collect()
    }

    fn declining_trends(&self, organism: &Organism) -> Vec<Candidate> {
        let half = self.trend_window / 2;
        organism
            .store()
            .concepts()
            .iter()
            .filter_map(|c| {
                let window = self.history.get(&c.name)?;
                if window.len() < self.trend_window {
                    return None;
                }
                let older = window.iter().take(half).sum::<f64>() / half as f64;
                let recent =
                    window.iter().skip(window.len() - half).sum::<f64>() / half as f64;
                if older <= 0.0 || recent >= DECLINE_RATIO * older {
                    return None;
                }
                let drop = 1.0 - recent / older;
                Some(Candidate::new(
                    CuriosityKind::DecliningTrend,
                    c.name.clone(),
                    0.5 + 0.4 * drop,
                    format!("activation fell from {older:.3} to {recent:.3}"),
                ))
            })
            .collect()
    }
}
