//! In-memory key store
//!
//! Generates Ed25519 key material for `CipherSuite::Cv25519` requests. The
//! secret scalar is sealed with the passphrase so the simulated card can
//! check it on upload.

use chrono::{DateTime, Utc};
use ed25519_dalek::{SecretKey, SigningKey};
use rand::rng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::simulated_card::seal_secret;
use crate::error::KeyStoreError;
use crate::model::{CipherSuite, Fingerprint, GenerationRequest, Key, SubkeyAvailability};
use crate::ports::KeyStore;

const FINGERPRINT_LEN: usize = 20;

#[derive(Debug, Default)]
pub struct SimulatedKeyStore {
    keys: Vec<Key>,
}

impl SimulatedKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn fingerprint_for(public: &[u8], created_at: DateTime<Utc>) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(created_at.timestamp().to_be_bytes());
    hasher.update(public);
    let digest = hasher.finalize();
    Fingerprint::from_bytes(&digest[..FINGERPRINT_LEN])
}

fn armor_public(fingerprint: &Fingerprint, user_ids: &[String], public: &[u8]) -> Vec<u8> {
    let mut text = String::from("-----BEGIN SIMULATED PUBLIC KEY-----\n");
    text.push_str(&format!("Fingerprint: {}\n", fingerprint));
    for uid in user_ids {
        text.push_str(&format!("User-ID: {}\n", uid));
    }
    text.push_str(&format!("\n{}\n", hex::encode(public)));
    text.push_str("-----END SIMULATED PUBLIC KEY-----\n");
    text.into_bytes()
}

impl KeyStore for SimulatedKeyStore {
    fn list_keys(&self) -> Result<Vec<Key>, KeyStoreError> {
        Ok(self.keys.clone())
    }

    fn create_key(&mut self, request: &GenerationRequest) -> Result<Key, KeyStoreError> {
        if request.cipher_suite != CipherSuite::Cv25519 {
            return Err(KeyStoreError::GenerationFailed {
                reason: format!("{} is not supported", request.cipher_suite.name()),
            });
        }
        if request.subkeys.is_empty() {
            return Err(KeyStoreError::GenerationFailed {
                reason: "no subkeys requested".to_string(),
            });
        }

        let mut secret_bytes = [0u8; 32];
        rng().fill_bytes(&mut secret_bytes);
        let signing_key = SigningKey::from_bytes(&SecretKey::from(secret_bytes));
        let public = signing_key.verifying_key().to_bytes();

        let fingerprint = fingerprint_for(&public, request.created_at);
        debug!(%fingerprint, "Generated simulated key material");

        let key = Key {
            public_key: armor_public(&fingerprint, &request.user_ids, &public),
            secret_material: seal_secret(&secret_bytes, request.passphrase.as_str()),
            fingerprint,
            created_at: request.created_at,
            expires_at: Some(request.expiration),
            user_ids: request.user_ids.clone(),
            capabilities: SubkeyAvailability::from(request.subkeys),
        };
        self.keys.push(key.clone());
        info!(fingerprint = %key.fingerprint, "Key stored");
        Ok(key)
    }
}
