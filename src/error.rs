//! Domain errors for the concept-graph core.
//!
//! Only programmer-facing mistakes are errors. Quiet-system outcomes
//! (empty graph, nothing above threshold, unknown activation seed) are
//! modelled as empty results by the callers instead.

use thiserror::Error;

/// Errors raised by the concept store and the operations built on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A referenced concept does not exist.
    #[error("concept not found: {0}")]
    NotFound(String),

    /// A concept with the same name is already registered.
    #[error("concept already exists: {0}")]
    Duplicate(String),

    /// A supplied vector does not match the store dimensionality.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    Validation { expected: usize, actual: usize },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::NotFound("ghost".into()).to_string(),
            "concept not found: ghost"
        );
        assert_eq!(
            CoreError::Validation {
                expected: 32,
                actual: 3
            }
            .to_string(),
            "vector dimension mismatch: expected 32, got 3"
        );
    }
}
