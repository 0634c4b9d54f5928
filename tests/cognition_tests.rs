//! End-to-end tests for the cognitive core.
//!
//! Everything runs in process; no external services are needed.
//! Run with: cargo test --test cognition_tests

use cognitive_core::cognition::{
    CognitionConfig, CognitionLoop, CognitionRunner, JsonlJournal, MemoryJournal, Verdict,
};
use cognitive_core::concepts::ConceptCategory;
use cognitive_core::learning::{compute_reward, QLearner};
use cognitive_core::memory::{CacheConfig, DecayingCache, ManualClock};
use cognitive_core::neurons::ActivationSnapshot;
use cognitive_core::{demo, Config, CoreError, Organism};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn exact_config() -> Config {
    let mut config = Config::default();
    config.store.dimensions = 3;
    config.store.default_uncertainty = 0.0;
    config
}

fn demo_organism(seed: u64) -> Organism {
    let mut config = Config::default();
    config.rng_seed = seed;
    let mut organism = Organism::new(&config);
    demo::populate(organism.store_mut(), 10, seed).unwrap();
    organism
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn test_single_step_from_orthogonal_concepts() {
    let mut organism = Organism::new(&exact_config());
    organism
        .add_concept("A", Some(&[1.0, 0.0, 0.0]), ConceptCategory::Idea, None)
        .unwrap();
    organism
        .add_concept("B", Some(&[0.0, 1.0, 0.0]), ConceptCategory::Idea, None)
        .unwrap();
    organism
        .add_concept("C", Some(&[0.0, 0.0, 1.0]), ConceptCategory::Idea, None)
        .unwrap();
    assert_eq!(organism.relate("A", "B", Some(0.8), true).unwrap(), 0.8);

    let snapshots = organism.activate("A", 1, 0.0);
    assert_eq!(snapshots.len(), 2);

    // Raw step-1 state is A = 1.0, B = 0.8, C = 0; then divided by the sum.
    let sum = 1.0 + 0.8 + 1e-10;
    let step = &snapshots[1];
    assert!((step.get("A").unwrap() - 1.0 / sum).abs() < 1e-12);
    assert!((step.get("B").unwrap() - 0.8 / sum).abs() < 1e-12);
    assert_eq!(step.get("C"), Some(0.0));
}

#[test]
fn test_zero_temperature_is_deterministic() {
    let run = || {
        let mut organism = demo_organism(3);
        organism.activate("alice", 4, 0.0)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_activation_stays_in_unit_interval() {
    let mut organism = demo_organism(8);
    for seed in ["alice", "river", "memory"] {
        for snapshot in organism.activate(seed, 6, 0.8) {
            assert!(snapshot
                .levels
                .iter()
                .all(|(_, a)| (0.0..=1.0).contains(a)));
        }
    }
}

#[test]
fn test_unknown_seed_and_errors() {
    let mut organism = Organism::new(&exact_config());
    assert!(organism.activate("nobody", 3, 0.1).is_empty());
    organism
        .add_concept("A", None, ConceptCategory::Idea, None)
        .unwrap();
    assert_eq!(
        organism.add_concept("A", None, ConceptCategory::Idea, None),
        Err(CoreError::Duplicate("A".into()))
    );
    assert_eq!(
        organism.relate("A", "Z", None, true),
        Err(CoreError::NotFound("Z".into()))
    );
    assert_eq!(
        organism.add_concept("B", Some(&[1.0, 0.0]), ConceptCategory::Idea, None),
        Err(CoreError::Validation {
            expected: 3,
            actual: 2
        })
    );
}

// ============================================================================
// Learning
// ============================================================================

#[test]
fn test_epsilon_never_increases_or_drops_below_floor() {
    let config = Config::default().learning;
    let floor = config.epsilon_min;
    let mut learner = QLearner::new(config, 1);
    let mut previous = learner.epsilon();
    for _ in 0..2_000 {
        let eps = learner.end_episode();
        assert!(eps <= previous);
        assert!(eps >= floor);
        previous = eps;
    }
    assert_eq!(previous, floor);
}

#[test]
fn test_reward_bounds() {
    let empty = ActivationSnapshot {
        step: 0,
        levels: vec![],
    };
    for useful in [0, 5, 50] {
        for diversity in [-10.0, 0.0, 1.0, 10.0, f64::NAN] {
            let r = compute_reward(&empty, useful, diversity);
            assert!((-1.0..=1.0).contains(&r));
        }
    }
}

// ============================================================================
// Decaying cache
// ============================================================================

fn cache_with(capacity: usize) -> (DecayingCache<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let config = CacheConfig {
        capacity,
        ..Default::default()
    };
    (DecayingCache::with_clock(config, clock.clone()), clock)
}

#[test]
fn test_retrieval_follows_decay() {
    // 0.9 · 0.98^T > 0.1  ⇔  T < ~108.8 s
    for (seconds, expected) in [(0, true), (60, true), (100, true), (110, false), (300, false)] {
        let (mut cache, clock) = cache_with(8);
        cache.store("k", "v".to_string(), 0.9);
        clock.advance(Duration::from_secs(seconds));
        assert_eq!(
            cache.retrieve("k").is_some(),
            expected,
            "after {seconds}s"
        );
        // A failed read never deletes
        assert_eq!(cache.len(), 1);
    }
}

#[test]
fn test_full_cache_evicts_weakest() {
    let (mut cache, _clock) = cache_with(10);
    for i in 1..=10 {
        cache.store(&format!("k{i}"), format!("v{i}"), i as f64 / 10.0);
    }
    cache.store("fresh", "new".to_string(), 0.5);

    assert_eq!(cache.len(), 10);
    assert!(cache.strength("k1").is_none());
    assert!(cache.strength("k2").is_some());
    assert_eq!(cache.retrieve("fresh").as_deref(), Some("new"));
}

#[test]
fn test_consolidate_leaves_only_readable_entries() {
    let (mut cache, clock) = cache_with(16);
    cache.store("weak", "w".to_string(), 0.2);
    cache.store("strong", "s".to_string(), 1.0);
    clock.advance(Duration::from_secs(40));
    // weak: 0.2 · 0.98^40 ≈ 0.089
    assert_eq!(cache.consolidate(), 1);
    assert!(cache.strength("strong").unwrap() > 0.1);
    assert_eq!(cache.find_similar("WEA", 5), vec![]);
}

// ============================================================================
// Cognition loop
// ============================================================================

#[tokio::test]
async fn test_fifty_cycles_on_seeded_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary.jsonl");
    let config = CognitionConfig {
        base_interval_ms: 0,
        ..Default::default()
    };

    let shared = demo_organism(42).into_shared();
    let cognition = CognitionLoop::new(
        shared.clone(),
        config,
        Arc::new(JsonlJournal::new(&path)),
        46,
    );
    let runner = CognitionRunner::spawn(cognition, CancellationToken::new(), Some(50));
    let cognition = runner.join().await.unwrap();
    assert_eq!(cognition.cycle(), 50);

    let diary = JsonlJournal::load(&path).await.unwrap();
    assert_eq!(diary.len(), 50);
    assert!(diary.windows(2).all(|w| w[0].cycle + 1 == w[1].cycle));
    assert_eq!(diary[0].cycle, 1);
    assert!(diary
        .iter()
        .any(|e| matches!(e.reflection.verdict, Verdict::Revealing | Verdict::Interesting)));
    assert!(diary.iter().all(|e| !e.candidate.is_idle()));

    // Consolidation ran at cycles 20 and 40
    let consolidated: Vec<u64> = diary
        .iter()
        .filter(|e| e.integration.consolidation.is_some())
        .map(|e| e.cycle)
        .collect();
    assert_eq!(consolidated, vec![20, 40]);

    // Graph invariants survive reinforcement and applied deltas
    let organism = shared.read().await;
    let store = organism.store();
    for r in store.all_relations() {
        assert!((0.0..=1.0).contains(&r.weight));
        if let Some(back) = store.edge_weight(&r.to, &r.from) {
            assert!((back - r.weight).abs() < 1e-12, "{} ↔ {}", r.from, r.to);
        }
    }
    assert_eq!(organism.learner().episodes(), 50);
}

#[tokio::test]
async fn test_stop_keeps_completed_diary_entries() {
    let journal = Arc::new(MemoryJournal::new());
    let config = CognitionConfig {
        base_interval_ms: 20,
        ..Default::default()
    };
    let cognition = CognitionLoop::new(demo_organism(1).into_shared(), config, journal.clone(), 2);
    let runner = CognitionRunner::spawn(cognition, CancellationToken::new(), None);

    tokio::time::sleep(Duration::from_millis(150)).await;
    let cognition = runner.shutdown().await.unwrap();

    let entries = journal.entries().await;
    assert!(!entries.is_empty());
    assert_eq!(entries.len() as u64, cognition.cycle());
    assert_eq!(entries.last().unwrap().cycle, cognition.cycle());
}

#[tokio::test]
async fn test_sandbox_is_isolated_while_loop_runs() {
    let shared = demo_organism(5).into_shared();
    let mut cognition = CognitionLoop::new(
        shared.clone(),
        CognitionConfig::default(),
        Arc::new(MemoryJournal::new()),
        6,
    );
    cognition.run_one_cycle().await;

    let mut sandbox = shared.read().await.sandbox();
    let before = shared.read().await.store().relation_count();
    sandbox
        .add_concept("what-if", None, ConceptCategory::Idea, None)
        .unwrap();
    sandbox.relate("what-if", "alice", Some(1.0), true).unwrap();

    cognition.run_one_cycle().await;
    let organism = shared.read().await;
    assert!(!organism.store().contains("what-if"));
    assert!(organism.store().relation_count() >= before);
}

#[tokio::test]
async fn test_snapshot_restore_continues_loop() {
    let original = demo_organism(12);
    let snapshot = original.store().snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored_snapshot = serde_json::from_str(&json).unwrap();

    let config = Config::default();
    let restored = Organism::from_snapshot(
        &config,
        &restored_snapshot,
        Arc::new(cognitive_core::memory::SystemClock),
    )
    .unwrap();
    assert_eq!(restored.store().len(), 10);
    assert_eq!(
        restored.store().relation_count(),
        original.store().relation_count()
    );

    let journal = Arc::new(MemoryJournal::new());
    let mut cognition =
        CognitionLoop::new(restored.into_shared(), config.cognition, journal.clone(), 1);
    for _ in 0..3 {
        cognition.run_one_cycle().await;
    }
    assert_eq!(journal.len().await, 3);
}
