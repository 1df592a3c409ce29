//! Smartcard session coordination for OpenPGP key provisioning
//!
//! A [`SessionCoordinator`] shares one token between a background presence
//! poller and the provisioning workflows (pin changes, cardholder data, key
//! upload, reset). Workflows that write to the token run with polling
//! suspended. Key generation goes to the key store and leaves polling alone.

pub mod adapters;
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod logic;
pub mod model;
pub mod ports;
pub mod session;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use error::{TumpaError, TumpaResult};
pub use session::{SessionCoordinator, SessionState};
pub use use_cases::{Outcome, Workflow};

// Re-export public API
pub use api::{simulated_session, SimulatedSession};
