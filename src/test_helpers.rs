//! Shared builders for unit tests.

use crate::concepts::ConceptCategory;
use crate::demo;
use crate::{Config, Organism};

/// Small vectors, default noise, fixed seed.
pub fn test_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.store.dimensions = 8;
    config.rng_seed = seed;
    config
}

/// Organism holding the given unrelated concepts.
pub fn organism_with(concepts: &[(&str, ConceptCategory)]) -> Organism {
    let mut organism = Organism::new(&test_config(0));
    for (name, category) in concepts {
        organism
            .add_concept(name, None, category.clone(), None)
            .unwrap();
    }
    organism
}

/// Ten-concept demo graph (ring plus chords over seven categories).
pub fn seeded_organism(seed: u64) -> Organism {
    let mut organism = Organism::new(&test_config(seed));
    demo::populate(organism.store_mut(), 10, seed).unwrap();
    organism
}
