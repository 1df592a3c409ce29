//! In-process OpenPGP card
//!
//! Models the pieces of card state the provisioning workflows touch: both
//! pins with a retry counter, cardholder name, public key URL, and the
//! occupied key slots. Used by the CLI's development mode and by tests.

use std::sync::{Mutex, MutexGuard};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::TokenError;
use crate::model::{AdminPin, Secret, SubkeyMask};
use crate::ports::{CardholderEditor, KeyUploader, PinAdministrator, PresenceProbe, TokenResetter};

pub const DEFAULT_USER_PIN: &str = "123456";
const PIN_RETRIES: u8 = 3;

/// Magic prefix of key material produced by the simulated key store.
pub(crate) const SEALED_MAGIC: &[u8; 4] = b"TSK1";
const DIGEST_LEN: usize = 32;
const SECRET_LEN: usize = 32;

/// Seal a secret scalar so that only the right passphrase unlocks it.
pub(crate) fn seal_secret(secret: &[u8; SECRET_LEN], passphrase: &str) -> Vec<u8> {
    let mut sealed = Vec::with_capacity(SEALED_MAGIC.len() + DIGEST_LEN + SECRET_LEN);
    sealed.extend_from_slice(SEALED_MAGIC);
    sealed.extend_from_slice(&passphrase_digest(secret, passphrase));
    sealed.extend_from_slice(secret);
    sealed
}

fn passphrase_digest(secret: &[u8], passphrase: &str) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.update(secret);
    hasher.finalize().into()
}

fn unseal<'a>(material: &'a [u8], passphrase: &Secret) -> Result<&'a [u8], TokenError> {
    let expected_len = SEALED_MAGIC.len() + DIGEST_LEN + SECRET_LEN;
    if material.len() != expected_len || !material.starts_with(SEALED_MAGIC) {
        return Err(TokenError::InvalidKeyMaterial {
            reason: "unrecognised secret key format".to_string(),
        });
    }
    let digest = &material[SEALED_MAGIC.len()..SEALED_MAGIC.len() + DIGEST_LEN];
    let secret = &material[SEALED_MAGIC.len() + DIGEST_LEN..];
    if passphrase_digest(secret, passphrase.as_str())[..] != *digest {
        return Err(TokenError::InvalidKeyMaterial {
            reason: "wrong key passphrase".to_string(),
        });
    }
    Ok(secret)
}

#[derive(Debug, Clone)]
struct CardState {
    present: bool,
    user_pin: String,
    admin_pin: String,
    admin_retries: u8,
    cardholder_name: Option<Vec<u8>>,
    public_key_url: Option<Vec<u8>>,
    occupied_slots: SubkeyMask,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            present: true,
            user_pin: DEFAULT_USER_PIN.to_string(),
            admin_pin: AdminPin::DEFAULT.to_string(),
            admin_retries: PIN_RETRIES,
            cardholder_name: None,
            public_key_url: None,
            occupied_slots: SubkeyMask::NONE,
        }
    }
}

impl CardState {
    fn ensure_present(&self) -> Result<(), TokenError> {
        if self.present {
            Ok(())
        } else {
            Err(TokenError::NotConnected)
        }
    }

    fn verify_admin(&mut self, admin_pin: &AdminPin) -> Result<(), TokenError> {
        self.ensure_present()?;
        if self.admin_retries == 0 {
            return Err(TokenError::PinBlocked);
        }
        if admin_pin.as_str() != self.admin_pin {
            self.admin_retries -= 1;
            if self.admin_retries == 0 {
                return Err(TokenError::PinBlocked);
            }
            return Err(TokenError::PinIncorrect {
                retries_remaining: self.admin_retries,
            });
        }
        self.admin_retries = PIN_RETRIES;
        Ok(())
    }
}

/// Snapshot of simulated card state, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    pub present: bool,
    pub admin_retries: u8,
    pub user_pin_is_default: bool,
    pub admin_pin_is_default: bool,
    pub cardholder_name: Option<String>,
    pub public_key_url: Option<String>,
    pub occupied_slots: SubkeyMask,
}

/// Simulated token, starting attached with factory pins.
#[derive(Debug, Default)]
pub struct SimulatedCard {
    state: Mutex<CardState>,
}

impl SimulatedCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absent() -> Self {
        let card = Self::default();
        card.set_present(false);
        card
    }

    fn state(&self) -> Result<MutexGuard<'_, CardState>, TokenError> {
        self.state
            .lock()
            .map_err(|_| TokenError::Communication("card state lock poisoned".to_string()))
    }

    /// Plug or unplug the simulated token.
    pub fn set_present(&self, present: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.present = present;
        }
    }

    pub fn snapshot(&self) -> Result<CardSnapshot, TokenError> {
        let state = self.state()?;
        Ok(CardSnapshot {
            present: state.present,
            admin_retries: state.admin_retries,
            user_pin_is_default: state.user_pin == DEFAULT_USER_PIN,
            admin_pin_is_default: state.admin_pin == AdminPin::DEFAULT,
            cardholder_name: state
                .cardholder_name
                .as_ref()
                .map(|n| String::from_utf8_lossy(n).into_owned()),
            public_key_url: state
                .public_key_url
                .as_ref()
                .map(|u| String::from_utf8_lossy(u).into_owned()),
            occupied_slots: state.occupied_slots,
        })
    }
}

impl PresenceProbe for SimulatedCard {
    fn is_present(&self) -> Result<bool, TokenError> {
        Ok(self.state()?.present)
    }
}

impl PinAdministrator for SimulatedCard {
    fn set_user_pin(&self, admin_pin: &AdminPin, new_pin: &Secret) -> Result<(), TokenError> {
        let mut state = self.state()?;
        state.verify_admin(admin_pin)?;
        state.user_pin = new_pin.as_str().to_string();
        debug!("Simulated card user pin replaced");
        Ok(())
    }

    fn set_admin_pin(
        &self,
        admin_pin: &AdminPin,
        new_admin_pin: &Secret,
    ) -> Result<(), TokenError> {
        let mut state = self.state()?;
        state.verify_admin(admin_pin)?;
        state.admin_pin = new_admin_pin.as_str().to_string();
        debug!("Simulated card admin pin replaced");
        Ok(())
    }
}

impl CardholderEditor for SimulatedCard {
    fn set_name(&self, admin_pin: &AdminPin, name: &[u8]) -> Result<(), TokenError> {
        let mut state = self.state()?;
        state.verify_admin(admin_pin)?;
        state.cardholder_name = Some(name.to_vec());
        Ok(())
    }

    fn set_url(&self, admin_pin: &AdminPin, url: &[u8]) -> Result<(), TokenError> {
        let mut state = self.state()?;
        state.verify_admin(admin_pin)?;
        state.public_key_url = Some(url.to_vec());
        Ok(())
    }
}

impl KeyUploader for SimulatedCard {
    fn upload(
        &self,
        key_material: &[u8],
        admin_pin: &AdminPin,
        passphrase: &Secret,
        subkeys: SubkeyMask,
    ) -> Result<(), TokenError> {
        let mut state = self.state()?;
        state.verify_admin(admin_pin)?;
        if subkeys.is_empty() {
            return Err(TokenError::Card("no key slot selected".to_string()));
        }
        // Raw material from outside the simulated store is accepted as-is.
        if key_material.starts_with(SEALED_MAGIC) {
            unseal(key_material, passphrase)?;
        } else if key_material.is_empty() {
            return Err(TokenError::InvalidKeyMaterial {
                reason: "empty key material".to_string(),
            });
        }
        state.occupied_slots = SubkeyMask::from_bits(state.occupied_slots.bits() | subkeys.bits());
        info!(slots = %subkeys, "Simulated card accepted key upload");
        Ok(())
    }
}

impl TokenResetter for SimulatedCard {
    fn reset(&self) -> Result<(), TokenError> {
        let mut state = self.state()?;
        state.ensure_present()?;
        *state = CardState::default();
        info!("Simulated card reset to factory state");
        Ok(())
    }
}
