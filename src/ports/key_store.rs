//! KeyStore trait - the local OpenPGP key store

use crate::error::KeyStoreError;
use crate::model::{GenerationRequest, Key};

/// Capability to enumerate and create keys
///
/// Storage format and key generation are the implementation's concern.
pub trait KeyStore {
    /// All keys, in no particular order
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError::ReadFailed` if the store cannot be read
    fn list_keys(&self) -> Result<Vec<Key>, KeyStoreError>;

    /// Generate and store a new key
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError::GenerationFailed` if the key cannot be created
    fn create_key(&mut self, request: &GenerationRequest) -> Result<Key, KeyStoreError>;
}
