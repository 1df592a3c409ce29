use crate::error::TokenError;
use crate::model::AdminPin;

/// Capability to write cardholder data objects.
///
/// Values arrive already encoded; the token stores them verbatim.
pub trait CardholderEditor {
    fn set_name(&self, admin_pin: &AdminPin, name: &[u8]) -> Result<(), TokenError>;

    fn set_url(&self, admin_pin: &AdminPin, url: &[u8]) -> Result<(), TokenError>;
}
