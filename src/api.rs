use std::sync::Arc;

use crate::adapters::{SimulatedCard, SimulatedKeyStore};
use crate::config::SessionConfig;
use crate::session::SessionCoordinator;

pub use crate::model::*;

/// A session over the in-process card and key store.
pub type SimulatedSession = SessionCoordinator<SimulatedCard, SimulatedKeyStore>;

/// Session with an attached factory-fresh simulated card and an empty store.
pub fn simulated_session(config: SessionConfig) -> SimulatedSession {
    simulated_session_with(SimulatedCard::new(), SimulatedKeyStore::new(), config)
}

pub fn simulated_session_with(
    card: SimulatedCard,
    store: SimulatedKeyStore,
    config: SessionConfig,
) -> SimulatedSession {
    SessionCoordinator::new(Arc::new(card), store, config)
}
