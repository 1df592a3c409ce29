use crate::error::TokenError;

/// Capability to check whether a token is attached.
///
/// Called from the poller thread, so implementations must be shareable.
pub trait PresenceProbe: Send + Sync {
    fn is_present(&self) -> Result<bool, TokenError>;
}
