//! Autonomous cognition loop
//!
//! Ties the concept store, propagation, Hebbian reinforcement, Q-learning
//! and the decaying cache together into a repeating state machine:
//!
//! ```text
//! CURIOSITY ──► EXPLORE ──► REFLECT ──► INTEGRATE ──► rest ──┐
//!     ▲                                    │ every N cycles  │
//!     │                                    └─► CONSOLIDATE   │
//!     └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] — `CognitionConfig`
//! - [`types`] — Candidate, Exploration, Reflection, Integration, DiaryEntry
//! - [`curiosity`] — candidate heuristics and selection
//! - [`exploration`] — propagation, refinement, coherence, new connections
//! - [`reflection`] — scoring and verdict
//! - [`cycle`] — `CognitionLoop::run_one_cycle`
//! - [`runner`] — cancellable background task
//! - [`journal`] — diary sinks (JSONL file, in-memory)
//! - [`collaborators`] — priority-adjustment source, concept-creation sink

pub mod collaborators;
pub mod config;
pub mod curiosity;
pub mod cycle;
pub mod exploration;
pub mod journal;
pub mod reflection;
pub mod runner;
pub mod types;

pub use collaborators::{
    ConceptCreationSink, NoveltyReport, PriorityAdjustmentSource, StaticAdjustments,
};
pub use config::CognitionConfig;
pub use curiosity::CuriosityEngine;
pub use cycle::CognitionLoop;
pub use journal::{JournalSink, JsonlJournal, MemoryJournal};
pub use runner::CognitionRunner;
pub use types::{
    Candidate, Consolidation, CuriosityKind, DiaryEntry, Exploration, Integration, Reflection,
    Verdict,
};
