//! Capacity-bounded associative cache with exponential strength decay.
//!
//! The strength of an entry read at any time is
//! `stored × decay_factor ^ elapsed_seconds`; every decayed read writes the
//! new strength (and the read time) back. When a new key arrives at
//! capacity, every entry is decayed and the globally weakest is evicted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::clock::{Clock, SystemClock};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub capacity: usize,
    /// Per-second multiplicative decay, in (0, 1]
    pub decay_factor: f64,
    /// Entries at or below this decayed strength are unreadable and get
    /// removed by `consolidate`
    pub retrieval_threshold: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            decay_factor: 0.98,
            retrieval_threshold: 0.1,
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    strength: f64,
    touched_at: Instant,
}

/// Time-decaying key/value store.
#[derive(Debug, Clone)]
pub struct DecayingCache<V> {
    config: CacheConfig,
    entries: HashMap<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> DecayingCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::with_capacity(config.capacity.min(1024)),
            config: CacheConfig {
                capacity: config.capacity.max(1),
                decay_factor: config.decay_factor.clamp(f64::MIN_POSITIVE, 1.0),
                ..config
            },
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Decay one entry to `now` in place and return its new strength.
    fn decay_entry(entry: &mut CacheEntry<V>, decay_factor: f64, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(entry.touched_at).as_secs_f64();
        entry.strength *= decay_factor.powf(elapsed);
        entry.touched_at = now;
        entry.strength
    }

    /// Insert or reinforce `key`.
    ///
    /// An existing key keeps `min(1, strength + decayed_old)`; a new key at
    /// capacity first evicts the weakest entry. A non-finite strength is
    /// stored as the minimum.
    pub fn store(&mut self, key: &str, value: V, strength: f64) {
        let now = self.clock.now();
        let strength = if strength.is_finite() {
            strength.clamp(f64::MIN_POSITIVE, 1.0)
        } else {
            f64::MIN_POSITIVE
        };
        let decay_factor = self.config.decay_factor;

        if let Some(entry) = self.entries.get_mut(key) {
            let decayed_old = Self::decay_entry(entry, decay_factor, now);
            entry.strength = (strength + decayed_old).min(1.0);
            entry.value = value;
            return;
        }

        if self.entries.len() >= self.config.capacity {
            self.evict_weakest(now);
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                strength,
                touched_at: now,
            },
        );
    }

    fn evict_weakest(&mut self, now: Instant) {
        let decay_factor = self.config.decay_factor;
        let mut weakest: Option<(String, f64)> = None;
        for (key, entry) in self.entries.iter_mut() {
            let s = Self::decay_entry(entry, decay_factor, now);
            let replace = match &weakest {
                None => true,
                Some((wk, ws)) => s < *ws || (s == *ws && key < wk),
            };
            if replace {
                weakest = Some((key.clone(), s));
            }
        }
        if let Some((key, strength)) = weakest {
            self.entries.remove(&key);
            debug!(key = %key, strength, "cache entry evicted");
        }
    }

    /// Value for `key` if its decayed strength is still above the retrieval
    /// threshold. A failed read leaves the (decayed) entry in place.
    pub fn retrieve(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let decay_factor = self.config.decay_factor;
        let threshold = self.config.retrieval_threshold;
        let entry = self.entries.get_mut(key)?;
        if Self::decay_entry(entry, decay_factor, now) > threshold {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Decayed strength of `key` (written back), regardless of threshold.
    pub fn strength(&mut self, key: &str) -> Option<f64> {
        let now = self.clock.now();
        let decay_factor = self.config.decay_factor;
        self.entries
            .get_mut(key)
            .map(|entry| Self::decay_entry(entry, decay_factor, now))
    }

    /// Keys containing `fragment` (case-insensitive), strongest first.
    /// Every matching entry is decayed as a side effect.
    pub fn find_similar(&mut self, fragment: &str, k: usize) -> Vec<(String, f64)> {
        let now = self.clock.now();
        let decay_factor = self.config.decay_factor;
        let needle = fragment.to_lowercase();

        let mut matches: Vec<(String, f64)> = self
            .entries
            .iter_mut()
            .filter(|(key, _)| key.to_lowercase().contains(&needle))
            .map(|(key, entry)| (key.clone(), Self::decay_entry(entry, decay_factor, now)))
            .collect();
        matches.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        matches.truncate(k);
        matches
    }

    /// Remove every entry whose decayed strength is at or below the
    /// retrieval threshold. Returns how many were removed.
    pub fn consolidate(&mut self) -> usize {
        let now = self.clock.now();
        let decay_factor = self.config.decay_factor;
        let threshold = self.config.retrieval_threshold;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| Self::decay_entry(entry, decay_factor, now) > threshold);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "cache consolidated");
        }
        removed
    }
}
