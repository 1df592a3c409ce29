//! KeyUploader trait - capability to move private key material onto a token

use crate::error::TokenError;
use crate::model::{AdminPin, Secret, SubkeyMask};

/// Capability to upload subkeys to the token
pub trait KeyUploader {
    /// Upload the subkeys named by `subkeys` from `key_material`
    ///
    /// # Arguments
    ///
    /// * `key_material` - Secret key material as held by the key store
    /// * `admin_pin` - Admin pin authorising the write
    /// * `passphrase` - Passphrase unlocking `key_material`
    /// * `subkeys` - Non-empty selection of subkeys to write
    fn upload(
        &self,
        key_material: &[u8],
        admin_pin: &AdminPin,
        passphrase: &Secret,
        subkeys: SubkeyMask,
    ) -> Result<(), TokenError>;
}
