//! Generate key use case
//!
//! Derives a generation request from the "new key" form and asks the key
//! store to create the key. The token is not involved.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{CollaboratorError, Operation, TumpaResult};
use crate::model::{GenerationRequest, Key, NewKeyParams};
use crate::ports::KeyStore;

/// Generate a new key in `store`
///
/// The key expires `config.validity_days` after `now`; its subkeys expire
/// with it.
///
/// # Errors
///
/// Returns errors if:
/// - The name is blank or no email is given
/// - The passphrase is blank or shorter than 6 characters
/// - No subkey is selected
/// - The key store fails to create the key
pub fn generate_key<S>(
    store: &mut S,
    params: &NewKeyParams,
    now: DateTime<Utc>,
    config: &SessionConfig,
) -> TumpaResult<Key>
where
    S: KeyStore + ?Sized,
{
    let request = GenerationRequest::derive(params, now, config.validity_days, config.cipher_suite)?;

    let key = store.create_key(&request).map_err(|source| {
        warn!(error = %source, "Key store failed to generate key");
        CollaboratorError::KeyStore {
            operation: Operation::GenerateKey,
            source,
        }
    })?;

    info!(fingerprint = %key.fingerprint, "Generated new key");
    Ok(key)
}
