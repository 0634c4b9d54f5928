//! The cognition loop: CURIOSITY → EXPLORE → REFLECT → INTEGRATE.
//!
//! [`CognitionLoop::run_one_cycle`] never fails. Every phase degrades to a
//! neutral result, and a diary entry is always produced and handed to the
//! journal. Every `consolidate_every` cycles the cache is consolidated and
//! the Q-learner's suggested weight deltas are applied to the graph.
//!
//! The organism lock is held for the synchronous phases only; collaborator
//! calls (concept creation, journal, events) happen after it is released.

use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::collaborators::{ConceptCreationSink, NoveltyReport, PriorityAdjustmentSource};
use super::config::CognitionConfig;
use super::curiosity::{exploration_key, CuriosityEngine};
use super::exploration::explore;
use super::journal::JournalSink;
use super::reflection::reflect;
use super::types::{
    Candidate, Consolidation, CuriosityKind, DiaryEntry, Exploration, Integration, Reflection,
    Verdict,
};
use crate::events::{CognitionEvent, EventEmitter};
use crate::learning::compute_reward;
use crate::neurons::ActivationSnapshot;
use crate::organism::{Organism, SharedOrganism};

/// Activation above which a concept counts as useful for the reward.
const USEFUL_THRESHOLD: f64 = 0.3;
/// Activation above which a concept's category counts toward diversity.
const DIVERSITY_THRESHOLD: f64 = 0.1;

/// One cognition loop over a shared organism.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use std::sync::Arc;
/// use cognitive_core::cognition::{CognitionLoop, MemoryJournal};
/// use cognitive_core::{demo, Config, Organism};
///
/// let config = Config::default();
/// let mut organism = Organism::new(&config);
/// demo::populate(organism.store_mut(), 10, config.rng_seed).unwrap();
///
/// let journal = Arc::new(MemoryJournal::new());
/// let mut cognition =
///     CognitionLoop::new(organism.into_shared(), config.cognition, journal.clone(), 7);
/// let entry = cognition.run_one_cycle().await;
/// assert_eq!(entry.cycle, 1);
/// assert_eq!(journal.len().await, 1);
/// # });
/// ```
pub struct CognitionLoop {
    organism: SharedOrganism,
    config: CognitionConfig,
    curiosity: CuriosityEngine,
    journal: Arc<dyn JournalSink>,
    adjustments: Option<Arc<dyn PriorityAdjustmentSource>>,
    creation: Option<Arc<dyn ConceptCreationSink>>,
    events: Option<Arc<dyn EventEmitter>>,
    run_id: Uuid,
    cycle: u64,
    last_concept: Option<String>,
}

impl CognitionLoop {
    pub fn new(
        organism: SharedOrganism,
        config: CognitionConfig,
        journal: Arc<dyn JournalSink>,
        seed: u64,
    ) -> Self {
        let curiosity = CuriosityEngine::new(&config, seed);
        Self {
            organism,
            config,
            curiosity,
            journal,
            adjustments: None,
            creation: None,
            events: None,
            run_id: Uuid::new_v4(),
            cycle: 0,
            last_concept: None,
        }
    }

    pub fn with_adjustments(mut self, source: Arc<dyn PriorityAdjustmentSource>) -> Self {
        self.adjustments = Some(source);
        self
    }

    pub fn with_creation_sink(mut self, sink: Arc<dyn ConceptCreationSink>) -> Self {
        self.creation = Some(sink);
        self
    }

    pub fn with_events(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.events = Some(emitter);
        self
    }

    pub fn organism(&self) -> &SharedOrganism {
        &self.organism
    }

    pub fn config(&self) -> &CognitionConfig {
        &self.config
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Number of completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Rest after a cycle with the given verdict.
    pub fn rest_duration(&self, verdict: Verdict) -> Duration {
        self.config
            .base_interval()
            .mul_f64(verdict.rest_multiplier())
    }

    /// Run one full cycle and return its diary entry.
    pub async fn run_one_cycle(&mut self) -> DiaryEntry {
        self.cycle += 1;
        let cycle = self.cycle;

        let factors: HashMap<CuriosityKind, f64> = self
            .adjustments
            .as_ref()
            .map(|source| source.adjustment_factors())
            .unwrap_or_default();

        let (candidate, mut exploration, reflection, mut integration) = {
            let mut organism = self.organism.write().await;
            organism.store_mut().set_cycle(cycle);

            let candidate =
                self.curiosity
                    .select(&mut organism, self.last_concept.as_deref(), &factors);
            let exploration = match &candidate.concept {
                Some(concept) => explore(&mut organism, concept, &self.config),
                None => Exploration::empty(None),
            };
            if let Some(snapshot) = &exploration.final_snapshot {
                self.curiosity.observe(snapshot);
            }
            let reflection = reflect(&exploration);
            let integration =
                self.integrate(&mut organism, cycle, &candidate, &exploration, &reflection);
            (candidate, exploration, reflection, integration)
        };

        integration.creation_requested = self.request_creation(cycle, &exploration).await;
        exploration.final_snapshot = None;

        let verdict = reflection.verdict;
        let rest = self.rest_duration(verdict);
        let entry = DiaryEntry {
            run_id: self.run_id,
            cycle,
            timestamp: Utc::now(),
            candidate,
            exploration,
            reflection,
            integration,
            rest_ms: rest.as_millis() as u64,
        };

        if let Err(e) = self.journal.append(&entry).await {
            warn!(cycle, error = %e, "Failed to append diary entry");
        }

        info!(
            cycle,
            kind = %entry.candidate.kind,
            concept = entry.candidate.concept.as_deref().unwrap_or("-"),
            verdict = %verdict,
            score = entry.reflection.score,
            "Cognition cycle completed"
        );

        if let Some(events) = &self.events {
            events.emit(CognitionEvent::CycleCompleted {
                cycle,
                concept: entry.candidate.concept.clone(),
                verdict,
                score: entry.reflection.score,
            });
            if let Some(c) = entry.integration.consolidation {
                events.emit(CognitionEvent::Consolidated {
                    cycle,
                    cache_removed: c.cache_removed,
                    deltas_applied: c.deltas_applied,
                });
            }
        }

        self.last_concept = entry.candidate.concept.clone();
        entry
    }

    // ------------------------------------------------------------------------
    // INTEGRATE
    // ------------------------------------------------------------------------

    fn integrate(
        &self,
        organism: &mut Organism,
        cycle: u64,
        candidate: &Candidate,
        exploration: &Exploration,
        reflection: &Reflection,
    ) -> Integration {
        let mut integration = Integration::default();

        if reflection.score > self.config.reinforce_threshold {
            let rate = organism.hebbian_config().rate;
            integration.hebbian_modifications = organism.reinforce(rate);
        }

        if let Some(destination) = &candidate.concept {
            let empty = ActivationSnapshot {
                step: 0,
                levels: Vec::new(),
            };
            let snapshot = exploration.final_snapshot.as_ref().unwrap_or(&empty);
            let useful = snapshot.above(USEFUL_THRESHOLD).len();
            let diversity = category_diversity(organism, snapshot);
            integration.reward = compute_reward(snapshot, useful, diversity);

            let origin = self
                .last_concept
                .clone()
                .unwrap_or_else(|| destination.clone());
            let next: Vec<String> = organism
                .store()
                .relations(destination)
                .map(|rels| rels.into_iter().map(|r| r.to).collect())
                .unwrap_or_default();
            integration.q_value = Some(organism.learner_mut().update(
                &origin,
                destination,
                integration.reward,
                &next,
            ));

            let strength = (0.3 + 0.7 * reflection.score).clamp(0.1, 1.0);
            organism.cache_mut().store(
                &exploration_key(destination),
                serde_json::json!({
                    "cycle": cycle,
                    "verdict": reflection.verdict,
                    "score": reflection.score,
                }),
                strength,
            );
        }
        integration.epsilon = organism.learner_mut().end_episode();

        if self.config.consolidate_every > 0 && cycle % self.config.consolidate_every == 0 {
            integration.consolidation = Some(self.consolidate(organism, cycle));
        }

        debug!(
            cycle,
            hebbian = integration.hebbian_modifications,
            reward = integration.reward,
            epsilon = integration.epsilon,
            "Integration finished"
        );
        integration
    }

    fn consolidate(&self, organism: &mut Organism, cycle: u64) -> Consolidation {
        let cache_removed = organism.cache_mut().consolidate();
        let threshold = organism.learner().config().delta_threshold;
        let deltas = organism.learner().suggest_weight_deltas(threshold);
        let deltas_applied = organism.apply_weight_deltas(&deltas);
        info!(
            cycle,
            cache_removed,
            suggested = deltas.len(),
            deltas_applied,
            "Consolidation pass"
        );
        Consolidation {
            cache_removed,
            deltas_applied,
        }
    }

    async fn request_creation(&self, cycle: u64, exploration: &Exploration) -> bool {
        if exploration.new_connections.is_empty() {
            return false;
        }
        let (Some(sink), Some(seed)) = (&self.creation, &exploration.seed) else {
            return false;
        };
        let report = NoveltyReport {
            cycle,
            seed: seed.clone(),
            pairs: exploration.new_connections.clone(),
        };
        match sink.on_novelty(&report).await {
            Ok(()) => true,
            Err(e) => {
                warn!(cycle, error = %e, "Concept creation request failed");
                false
            }
        }
    }
}

/// Share of known categories represented among active concepts.
fn category_diversity(organism: &Organism, snapshot: &ActivationSnapshot) -> f64 {
    let store = organism.store();
    let total = store.categories().len();
    if total == 0 {
        return 0.0;
    }
    let active: BTreeSet<_> = snapshot
        .above(DIVERSITY_THRESHOLD)
        .into_iter()
        .filter_map(|(name, _)| store.concept(name).map(|c| &c.category))
        .collect();
    active.len() as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::journal::MemoryJournal;
    use crate::cognition::StaticAdjustments;
    use crate::events::EventBus;
    use crate::test_helpers::{organism_with, seeded_organism};
    use crate::{demo, Config, YamlConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cognition(
        organism: Organism,
        config: CognitionConfig,
    ) -> (CognitionLoop, Arc<MemoryJournal>) {
        let journal = Arc::new(MemoryJournal::new());
        let cognition = CognitionLoop::new(organism.into_shared(), config, journal.clone(), 42);
        (cognition, journal)
    }

    #[tokio::test]
    async fn test_empty_graph_cycle_is_idle() {
        let (mut cognition, journal) = cognition(organism_with(&[]), CognitionConfig::default());
        let entry = cognition.run_one_cycle().await;

        assert_eq!(entry.cycle, 1);
        assert!(entry.candidate.is_idle());
        assert_eq!(entry.exploration, Exploration::empty(None));
        assert_eq!(entry.reflection.verdict, Verdict::Routine);
        assert!(entry.integration.q_value.is_none());
        assert_eq!(entry.rest_ms, 10_000);
        assert_eq!(journal.len().await, 1);
    }

    #[tokio::test]
    async fn test_cycles_are_journaled_in_order() {
        let (mut cognition, journal) = cognition(seeded_organism(5), CognitionConfig::default());
        for _ in 0..5 {
            cognition.run_one_cycle().await;
        }
        let cycles: Vec<u64> = journal.entries().await.iter().map(|e| e.cycle).collect();
        assert_eq!(cycles, vec![1, 2, 3, 4, 5]);
        assert_eq!(cognition.cycle(), 5);
        assert!(journal
            .entries()
            .await
            .iter()
            .all(|e| e.run_id == cognition.run_id()));
    }

    #[tokio::test]
    async fn test_cycle_feeds_learner_and_cache() {
        let (mut cognition, _journal) = cognition(seeded_organism(5), CognitionConfig::default());
        let entry = cognition.run_one_cycle().await;
        let concept = entry.candidate.concept.clone().unwrap();

        let organism = cognition.organism().read().await;
        assert_eq!(organism.learner().episodes(), 1);
        assert!(organism.learner().len() >= 1);
        assert!((-1.0..=1.0).contains(&entry.integration.reward));
        assert!(organism.cache().len() == 1);
        drop(organism);

        let mut organism = cognition.organism().write().await;
        assert!(organism
            .cache_mut()
            .strength(&exploration_key(&concept))
            .is_some());
    }

    #[tokio::test]
    async fn test_rest_duration_follows_verdict() {
        let config = CognitionConfig {
            base_interval_ms: 1_000,
            ..Default::default()
        };
        let (cognition, _) = cognition(organism_with(&[]), config);
        assert_eq!(
            cognition.rest_duration(Verdict::Revealing),
            Duration::from_millis(500)
        );
        assert_eq!(
            cognition.rest_duration(Verdict::Interesting),
            Duration::from_millis(1_000)
        );
        assert_eq!(
            cognition.rest_duration(Verdict::Routine),
            Duration::from_millis(2_000)
        );
    }

    #[tokio::test]
    async fn test_consolidation_runs_on_schedule() {
        let config = CognitionConfig {
            consolidate_every: 3,
            ..Default::default()
        };
        let (mut cognition, _) = cognition(seeded_organism(2), config);
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        cognition = cognition.with_events(Arc::new(bus));

        let mut consolidated = Vec::new();
        for _ in 0..6 {
            let entry = cognition.run_one_cycle().await;
            if entry.integration.consolidation.is_some() {
                consolidated.push(entry.cycle);
            }
        }
        assert_eq!(consolidated, vec![3, 6]);

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push((event.cycle(), event.kind()));
        }
        assert_eq!(kinds.len(), 8);
        assert!(kinds.contains(&(3, "consolidated")));
        assert!(kinds.contains(&(6, "consolidated")));
    }

    fn organism_from_yaml(yaml: &str) -> (Organism, Config) {
        let config: Config = serde_yaml::from_str::<YamlConfig>(yaml).unwrap().into();
        let mut organism = Organism::new(&config);
        demo::populate(organism.store_mut(), 10, config.rng_seed).unwrap();
        (organism, config)
    }

    #[tokio::test]
    async fn test_zero_hebbian_rate_from_yaml_disables_reinforcement() {
        let (organism, config) = organism_from_yaml("hebbian:\n  rate: 0.0\n");
        assert_eq!(organism.hebbian_config().rate, 0.0);
        let (mut cognition, journal) = cognition(organism, config.cognition);
        for _ in 0..50 {
            cognition.run_one_cycle().await;
        }
        let entries = journal.entries().await;
        let total: usize = entries
            .iter()
            .map(|e| e.integration.hebbian_modifications)
            .sum();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_exploration_uses_propagation_defaults_from_yaml() {
        let (organism, config) = organism_from_yaml("propagation:\n  default_steps: 5\n");
        let (mut cognition, _) = cognition(organism, config.cognition);
        let entry = cognition.run_one_cycle().await;
        assert!(entry.candidate.concept.is_some());
        assert_eq!(entry.exploration.steps, 5);
    }

    struct CountingSink(AtomicUsize);

    #[async_trait::async_trait]
    impl ConceptCreationSink for CountingSink {
        async fn on_novelty(&self, report: &NoveltyReport) -> anyhow::Result<()> {
            assert!(!report.pairs.is_empty());
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait::async_trait]
    impl ConceptCreationSink for FailingSink {
        async fn on_novelty(&self, _report: &NoveltyReport) -> anyhow::Result<()> {
            anyhow::bail!("creation backend offline")
        }
    }

    #[tokio::test]
    async fn test_creation_sink_called_on_novelty() {
        let sink = Arc::new(CountingSink(AtomicUsize::new(0)));
        let (cognition, journal) = cognition(seeded_organism(9), CognitionConfig::default());
        let mut cognition = cognition.with_creation_sink(sink.clone());
        for _ in 0..20 {
            cognition.run_one_cycle().await;
        }
        let requested = journal
            .entries()
            .await
            .iter()
            .filter(|e| e.integration.creation_requested)
            .count();
        let novel = journal
            .entries()
            .await
            .iter()
            .filter(|e| !e.exploration.new_connections.is_empty())
            .count();
        assert_eq!(requested, novel);
        assert_eq!(sink.0.load(Ordering::SeqCst), novel);
    }

    #[tokio::test]
    async fn test_failing_creation_sink_degrades() {
        let (cognition, journal) = cognition(seeded_organism(9), CognitionConfig::default());
        let mut cognition = cognition.with_creation_sink(Arc::new(FailingSink));
        for _ in 0..10 {
            cognition.run_one_cycle().await;
        }
        let entries = journal.entries().await;
        assert_eq!(entries.len(), 10);
        assert!(entries.iter().all(|e| !e.integration.creation_requested));
    }

    #[tokio::test]
    async fn test_adjustments_steer_curiosity() {
        let source = StaticAdjustments::default()
            .with(CuriosityKind::KnowledgeGap, 0.0)
            .with(CuriosityKind::DecliningTrend, 0.0)
            .with(CuriosityKind::HighPotential, 0.0)
            .with(CuriosityKind::Random, 0.0)
            .with(CuriosityKind::Bridge, 5.0);
        let (cognition, journal) = cognition(seeded_organism(4), CognitionConfig::default());
        let mut cognition = cognition.with_adjustments(Arc::new(source));
        for _ in 0..5 {
            cognition.run_one_cycle().await;
        }
        assert!(journal
            .entries()
            .await
            .iter()
            .all(|e| e.candidate.kind == CuriosityKind::Bridge));
    }
}
