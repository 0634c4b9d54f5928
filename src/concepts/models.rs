//! Concept graph data models.
//!
//! - [`ConceptCategory`] — closed category set with an `Other` escape hatch
//! - [`Concept`] — per-node metadata (vectors live in the store's dense banks)
//! - [`Relation`] — a directed weighted edge
//! - [`ConceptRecord`] / [`GraphSnapshot`] — plain dump consumed by persistence
//!   collaborators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Category
// ============================================================================

/// Category of a concept.
///
/// Category-specific behaviour (knowledge-gap detection, cross-category
/// novelty) matches on this enum rather than comparing strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptCategory {
    Person,
    Place,
    Object,
    Activity,
    Emotion,
    Idea,
    Time,
    Other(String),
}

impl fmt::Display for ConceptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Place => write!(f, "place"),
            Self::Object => write!(f, "object"),
            Self::Activity => write!(f, "activity"),
            Self::Emotion => write!(f, "emotion"),
            Self::Idea => write!(f, "idea"),
            Self::Time => write!(f, "time"),
            Self::Other(label) => write!(f, "{}", label),
        }
    }
}

impl FromStr for ConceptCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "person" => Self::Person,
            "place" => Self::Place,
            "object" => Self::Object,
            "activity" => Self::Activity,
            "emotion" => Self::Emotion,
            "idea" => Self::Idea,
            "time" => Self::Time,
            other => Self::Other(other.to_string()),
        })
    }
}

// ============================================================================
// Concept / Relation
// ============================================================================

/// Bookkeeping for a single concept.
///
/// The base and current feature vectors are kept in the store's contiguous
/// vector banks (addressed by `slot`) so similarity can be computed over one
/// flat buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    /// Unique, stable name
    pub name: String,
    /// Dense index into the weight matrix and vector banks
    pub slot: usize,
    /// External feedback strength, clamped to [0, 2]
    pub strength: f64,
    /// Number of propagation steps in which this concept exceeded 0.3
    pub activation_count: u64,
    /// Global cycle of the most recent such step (`None` if never active)
    pub last_active_cycle: Option<u64>,
    pub category: ConceptCategory,
    pub created_at_cycle: u64,
}

/// A directed, weighted edge between two concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    /// Weight in [0, 1]
    pub weight: f64,
}

// ============================================================================
// Snapshot dump
// ============================================================================

/// Plain concept dump, including both feature vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub name: String,
    pub category: ConceptCategory,
    pub base_vector: Vec<f64>,
    pub current_vector: Vec<f64>,
    pub strength: f64,
    pub activation_count: u64,
    pub last_active_cycle: Option<u64>,
    pub created_at_cycle: u64,
}

/// Everything a persistence collaborator needs to rebuild the graph.
///
/// Concepts are listed in slot order, relations in per-source insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub dimensions: usize,
    pub cycle: u64,
    pub concepts: Vec<ConceptRecord>,
    pub relations: Vec<Relation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("Person".parse::<ConceptCategory>().unwrap(), ConceptCategory::Person);
        assert_eq!(
            "music".parse::<ConceptCategory>().unwrap(),
            ConceptCategory::Other("music".into())
        );
        assert_eq!(ConceptCategory::Emotion.to_string(), "emotion");
        assert_eq!(ConceptCategory::Other("music".into()).to_string(), "music");
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ConceptCategory::Place).unwrap();
        assert_eq!(json, "\"place\"");
        let back: ConceptCategory = serde_json::from_str("{\"other\":\"music\"}").unwrap();
        assert_eq!(back, ConceptCategory::Other("music".into()));
    }
}
