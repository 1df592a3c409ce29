//! Subkey selection encoding

use crate::model::{Key, SubkeyAvailability, SubkeyMask};

/// Combine the three capability checkboxes into the token's bitmask.
///
/// No range validation happens here; an empty mask is rejected by the
/// workflow that consumes it.
pub fn encode(enc: bool, sign: bool, auth: bool) -> SubkeyMask {
    let bits = enc as u8 * SubkeyMask::ENCRYPTION
        + sign as u8 * SubkeyMask::SIGNING
        + auth as u8 * SubkeyMask::AUTHENTICATION;
    SubkeyMask::from_bits(bits)
}

/// Which subkey checkboxes may be offered for `key`.
pub fn decode_availability(key: &Key) -> SubkeyAvailability {
    key.capabilities()
}
