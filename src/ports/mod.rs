//! Ports (traits) for the token and the key store
//!
//! The session core depends on these abstractions, not on concrete
//! drivers. Token ports take `&self`: one handle is shared between the
//! poller thread and the foreground, and the session state machine keeps
//! them from using it at the same time.

mod cardholder_editor;
mod key_store;
mod key_uploader;
mod pin_administrator;
mod presence_probe;
mod token_resetter;

pub use cardholder_editor::CardholderEditor;
pub use key_store::KeyStore;
pub use key_uploader::KeyUploader;
pub use pin_administrator::PinAdministrator;
pub use presence_probe::PresenceProbe;
pub use token_resetter::TokenResetter;

/// Combined trait for every token operation
///
/// A token driver handle typically implements this.
pub trait SmartCard:
    PresenceProbe + PinAdministrator + CardholderEditor + KeyUploader + TokenResetter
{
}

// Blanket implementation for types that implement all operation traits
impl<T> SmartCard for T where
    T: PresenceProbe + PinAdministrator + CardholderEditor + KeyUploader + TokenResetter
{
}
