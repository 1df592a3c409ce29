//! Upload key use case
//!
//! Moves the selected subkeys of a stored key onto the token.

use tracing::{info, warn};

use super::Outcome;
use crate::error::{CollaboratorError, Operation, TumpaResult, ValidationError};
use crate::logic::decode_availability;
use crate::model::{AdminPin, Key, Secret, SubkeyMask};
use crate::ports::KeyUploader;

/// Upload the subkeys named by `subkeys` from `key`
///
/// Checks run in dialog order: a key must be selected, then the admin pin,
/// the passphrase, and the subkey selection. A selection naming a subkey
/// the key does not have is rejected.
///
/// # Errors
///
/// Returns errors if:
/// - `key` is `None`
/// - The admin pin is shorter than 8 characters
/// - The passphrase is shorter than 6 characters
/// - `subkeys` is empty or not offered by the key
/// - The token rejects the upload
pub fn upload_key<C>(
    card: &C,
    key: Option<&Key>,
    admin_pin: &str,
    passphrase: &str,
    subkeys: SubkeyMask,
) -> TumpaResult<Outcome>
where
    C: KeyUploader + ?Sized,
{
    let key = key.ok_or(ValidationError::NoKeySelected)?;
    let admin_pin = AdminPin::new(admin_pin)?;
    let passphrase = Secret::passphrase(passphrase)?;

    if subkeys.is_empty() {
        return Err(ValidationError::NoSubkeySelected.into());
    }
    if let Some(capability) = subkeys.first_missing(decode_availability(key)) {
        return Err(ValidationError::SubkeyUnavailable {
            fingerprint: key.fingerprint.clone(),
            capability,
        }
        .into());
    }

    card.upload(&key.secret_material, &admin_pin, &passphrase, subkeys)
        .map_err(|source| {
            warn!(fingerprint = %key.fingerprint, error = %source, "Token rejected key upload");
            CollaboratorError::Token {
                operation: Operation::UploadKey,
                source,
            }
        })?;

    info!(fingerprint = %key.fingerprint, subkeys = %subkeys, "Key uploaded to token");
    Ok(Outcome::completed(Operation::UploadKey))
}
