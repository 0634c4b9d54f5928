//! Neural dynamics over the concept graph
//!
//! Implements spreading activation over the dense weight matrix:
//! concepts act as neurons, relations as weighted synapses, and the
//! temperature controls how noisy each step is. Hebbian reinforcement then
//! strengthens (or creates) the synapses between co-active concepts.

pub mod activation;
pub mod config;
pub mod hebbian;

pub use activation::{ActivationSnapshot, PropagationEngine};
pub use config::{HebbianConfig, PropagationConfig};
pub use hebbian::HebbianModifier;
