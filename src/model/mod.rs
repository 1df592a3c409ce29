//! Domain types for session and provisioning operations
//!
//! These types wrap primitives to enforce invariants at construction
//! and keep credentials out of logs.

mod cipher;
mod confirmation;
mod fingerprint;
mod generation;
mod key;
mod pin;
mod subkey;
mod text;

pub use cipher::CipherSuite;
pub use confirmation::Confirmation;
pub use fingerprint::{Fingerprint, FingerprintError};
pub use generation::{GenerationRequest, NewKeyParams, DEFAULT_VALIDITY_DAYS};
pub use key::Key;
pub use pin::{AdminPin, Secret};
pub use subkey::{SubkeyAvailability, SubkeyMask};
pub use text::CardText;
