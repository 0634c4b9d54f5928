//! Reward-driven edge adaptation
//!
//! - [`q_learning`] — sparse Q-table over concept pairs with ε-greedy selection
//! - [`reward`] — episode reward in [-1, 1]

pub mod q_learning;
pub mod reward;

pub use q_learning::{LearningConfig, QLearner, WeightDelta};
pub use reward::compute_reward;
