//! Recording fakes for tests
//!
//! Wrap the simulated adapters, log every collaborator call and allow a
//! failure to be injected for the next call.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::{SimulatedCard, SimulatedKeyStore};
use crate::error::{KeyStoreError, TokenError};
use crate::model::{AdminPin, GenerationRequest, Key, Secret, SubkeyMask};
use crate::ports::{
    CardholderEditor, KeyStore, KeyUploader, PinAdministrator, PresenceProbe, TokenResetter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetUserPin { admin_pin: String, new_pin: String },
    SetAdminPin { admin_pin: String, new_pin: String },
    SetName { admin_pin: String, name: Vec<u8> },
    SetUrl { admin_pin: String, url: Vec<u8> },
    Upload {
        key_material: Vec<u8>,
        admin_pin: String,
        passphrase: String,
        subkeys: SubkeyMask,
    },
    Reset,
}

#[derive(Debug, Default)]
pub struct RecordingCard {
    pub inner: SimulatedCard,
    calls: Mutex<Vec<Call>>,
    fail_next: Mutex<Option<TokenError>>,
    presence_queries: AtomicUsize,
    presence_broken: AtomicBool,
    presence_delay: Mutex<Duration>,
    queries_in_flight: AtomicUsize,
    max_queries_in_flight: AtomicUsize,
    writes_during_query: AtomicUsize,
}

impl RecordingCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self, error: TokenError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn presence_queries(&self) -> usize {
        self.presence_queries.load(Ordering::SeqCst)
    }

    /// Make every presence query fail.
    pub fn break_presence(&self, broken: bool) {
        self.presence_broken.store(broken, Ordering::SeqCst);
    }

    /// Make every presence query take `delay`.
    pub fn set_presence_delay(&self, delay: Duration) {
        *self.presence_delay.lock().unwrap() = delay;
    }

    pub fn queries_in_flight(&self) -> usize {
        self.queries_in_flight.load(Ordering::SeqCst)
    }

    /// Most presence queries ever running at the same time.
    pub fn max_queries_in_flight(&self) -> usize {
        self.max_queries_in_flight.load(Ordering::SeqCst)
    }

    /// Token writes that started while a presence query was running.
    pub fn writes_during_query(&self) -> usize {
        self.writes_during_query.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) -> Result<(), TokenError> {
        if self.queries_in_flight() > 0 {
            self.writes_during_query.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl PresenceProbe for RecordingCard {
    fn is_present(&self) -> Result<bool, TokenError> {
        self.presence_queries.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.queries_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_queries_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.presence_delay.lock().unwrap();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let result = if self.presence_broken.load(Ordering::SeqCst) {
            Err(TokenError::Communication("pcscd not running".to_string()))
        } else {
            self.inner.is_present()
        };

        self.queries_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl PinAdministrator for RecordingCard {
    fn set_user_pin(&self, admin_pin: &AdminPin, new_pin: &Secret) -> Result<(), TokenError> {
        self.record(Call::SetUserPin {
            admin_pin: admin_pin.as_str().to_string(),
            new_pin: new_pin.as_str().to_string(),
        })?;
        self.inner.set_user_pin(admin_pin, new_pin)
    }

    fn set_admin_pin(
        &self,
        admin_pin: &AdminPin,
        new_admin_pin: &Secret,
    ) -> Result<(), TokenError> {
        self.record(Call::SetAdminPin {
            admin_pin: admin_pin.as_str().to_string(),
            new_pin: new_admin_pin.as_str().to_string(),
        })?;
        self.inner.set_admin_pin(admin_pin, new_admin_pin)
    }
}

impl CardholderEditor for RecordingCard {
    fn set_name(&self, admin_pin: &AdminPin, name: &[u8]) -> Result<(), TokenError> {
        self.record(Call::SetName {
            admin_pin: admin_pin.as_str().to_string(),
            name: name.to_vec(),
        })?;
        self.inner.set_name(admin_pin, name)
    }

    fn set_url(&self, admin_pin: &AdminPin, url: &[u8]) -> Result<(), TokenError> {
        self.record(Call::SetUrl {
            admin_pin: admin_pin.as_str().to_string(),
            url: url.to_vec(),
        })?;
        self.inner.set_url(admin_pin, url)
    }
}

impl KeyUploader for RecordingCard {
    fn upload(
        &self,
        key_material: &[u8],
        admin_pin: &AdminPin,
        passphrase: &Secret,
        subkeys: SubkeyMask,
    ) -> Result<(), TokenError> {
        self.record(Call::Upload {
            key_material: key_material.to_vec(),
            admin_pin: admin_pin.as_str().to_string(),
            passphrase: passphrase.as_str().to_string(),
            subkeys,
        })?;
        self.inner.upload(key_material, admin_pin, passphrase, subkeys)
    }
}

impl TokenResetter for RecordingCard {
    fn reset(&self) -> Result<(), TokenError> {
        self.record(Call::Reset)?;
        self.inner.reset()
    }
}

#[derive(Debug, Default)]
pub struct RecordingKeyStore {
    pub inner: SimulatedKeyStore,
    pub create_calls: usize,
    pub fail_next: Option<KeyStoreError>,
    /// Returned by every `list_keys` while set
    pub fail_list: Option<KeyStoreError>,
}

impl RecordingKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: Vec<Key>) -> Self {
        Self {
            inner: SimulatedKeyStore::with_keys(keys),
            ..Self::default()
        }
    }
}

impl KeyStore for RecordingKeyStore {
    fn list_keys(&self) -> Result<Vec<Key>, KeyStoreError> {
        if let Some(error) = &self.fail_list {
            return Err(error.clone());
        }
        self.inner.list_keys()
    }

    fn create_key(&mut self, request: &GenerationRequest) -> Result<Key, KeyStoreError> {
        self.create_calls += 1;
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.inner.create_key(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::{key_store_contract, smartcard_contract};

    contract_tests_for!(
        recording_card_contract,
        make = RecordingCard::new,
        tests = {
            test_presence_reported => smartcard_contract::test_presence_reported,
            test_set_user_pin_success => smartcard_contract::test_set_user_pin_success,
            test_set_user_pin_wrong_admin => smartcard_contract::test_set_user_pin_wrong_admin,
            test_set_admin_pin_replaces_old => smartcard_contract::test_set_admin_pin_replaces_old,
            test_set_name_and_url => smartcard_contract::test_set_name_and_url,
            test_upload_success => smartcard_contract::test_upload_success,
            test_reset_restores_default_admin_pin => smartcard_contract::test_reset_restores_default_admin_pin,
        }
    );

    contract_tests_for!(
        recording_store_contract,
        make = RecordingKeyStore::new,
        tests = {
            test_create_then_list => key_store_contract::test_create_then_list,
            test_capabilities_follow_mask => key_store_contract::test_capabilities_follow_mask,
        }
    );

    #[test]
    fn test_injected_failure_applies_once() {
        let card = RecordingCard::new();
        card.fail_next(TokenError::Card("boom".to_string()));

        assert!(card.reset().is_err());
        assert!(card.reset().is_ok());
        assert_eq!(card.calls(), vec![Call::Reset, Call::Reset]);
    }

    #[test]
    fn test_broken_presence_errors() {
        let card = RecordingCard::new();
        card.break_presence(true);
        assert!(card.is_present().is_err());
        assert_eq!(card.presence_queries(), 1);
    }
}
