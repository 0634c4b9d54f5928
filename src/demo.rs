//! Seeded demo graph, used by `cognitive-core run --demo N` and by tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::concepts::{ConceptCategory, ConceptStore};
use crate::error::CoreResult;

static VOCABULARY: [(&str, ConceptCategory); 14] = [
    ("alice", ConceptCategory::Person),
    ("river", ConceptCategory::Place),
    ("lamp", ConceptCategory::Object),
    ("walking", ConceptCategory::Activity),
    ("joy", ConceptCategory::Emotion),
    ("freedom", ConceptCategory::Idea),
    ("morning", ConceptCategory::Time),
    ("bob", ConceptCategory::Person),
    ("city", ConceptCategory::Place),
    ("book", ConceptCategory::Object),
    ("reading", ConceptCategory::Activity),
    ("calm", ConceptCategory::Emotion),
    ("memory", ConceptCategory::Idea),
    ("winter", ConceptCategory::Time),
];

/// Add `size` concepts and link them into a ring with a few chords.
///
/// Names come from a fixed vocabulary, then `concept-<i>` in an
/// `other("generated")` category. Weights are drawn from U(0.3, 0.9) with a
/// generator seeded by `seed`. Returns the number of relations written.
pub fn populate(store: &mut ConceptStore, size: usize, seed: u64) -> CoreResult<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut names = Vec::with_capacity(size);
    for i in 0..size {
        let (name, category) = match VOCABULARY.get(i) {
            Some((name, category)) => (name.to_string(), category.clone()),
            None => (
                format!("concept-{i}"),
                ConceptCategory::Other("generated".to_string()),
            ),
        };
        store.add_concept(&name, None, category, None)?;
        names.push(name);
    }

    let mut relations = 0;
    if size < 2 {
        return Ok(relations);
    }
    let ring = if size == 2 { 1 } else { size };
    for i in 0..ring {
        let weight = rng.gen_range(0.3..0.9);
        store.relate(&names[i], &names[(i + 1) % size], Some(weight), true)?;
        relations += 1;
    }
    if size >= 6 {
        let half = size / 2;
        for i in (0..half).step_by(3) {
            let weight = rng.gen_range(0.3..0.9);
            store.relate(&names[i], &names[i + half], Some(weight), true)?;
            relations += 1;
        }
    }
    Ok(relations)
}
