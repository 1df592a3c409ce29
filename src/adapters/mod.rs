//! Adapters - concrete implementations of ports (traits)

mod simulated_card;
mod simulated_store;

#[cfg(test)]
pub mod recording;

// Re-export for convenience
pub use simulated_card::{CardSnapshot, SimulatedCard, DEFAULT_USER_PIN};
pub use simulated_store::SimulatedKeyStore;
