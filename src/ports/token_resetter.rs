use crate::error::TokenError;

/// Capability to return the token to factory state.
pub trait TokenResetter {
    fn reset(&self) -> Result<(), TokenError>;
}
