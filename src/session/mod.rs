//! Session state machine and presence polling

mod coordinator;
mod key_list;
mod poller;
mod state;

pub use coordinator::{PresenceListener, SessionCoordinator};
pub use key_list::KeyList;
pub use poller::{PresenceEvent, PresencePoller};
pub use state::SessionState;
