//! Session coordinator
//!
//! Owns the session state machine. Presence polling runs only while
//! `PollingActive`; any workflow that writes to the token first moves the
//! session to `WorkflowExclusive`, which stops the poller, and moves it back
//! once the workflow is over.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::key_list::KeyList;
use super::poller::{PresenceEvent, PresencePoller};
use super::state::SessionState;
use crate::config::SessionConfig;
use crate::error::{CollaboratorError, Operation, SessionError, TumpaResult};
use crate::logic::decode_availability;
use crate::model::{Fingerprint, Key, SubkeyAvailability};
use crate::ports::{KeyStore, SmartCard};
use crate::use_cases::{
    change_admin_pin, change_user_pin, generate_key, reset_token, set_cardholder_name,
    set_public_key_url, upload_key, Outcome, Workflow,
};

/// Receives the presence flag each time the coordinator acts on it.
pub type PresenceListener = Box<dyn FnMut(bool) + Send>;

pub struct SessionCoordinator<C, K>
where
    C: SmartCard + 'static,
    K: KeyStore,
{
    card: Arc<C>,
    store: K,
    config: SessionConfig,
    state: SessionState,
    epoch: u64,
    poller: Option<PresencePoller>,
    events_tx: Sender<PresenceEvent>,
    events_rx: Receiver<PresenceEvent>,
    keys: KeyList,
    upload_enabled: bool,
    listener: Option<PresenceListener>,
}

impl<C, K> SessionCoordinator<C, K>
where
    C: SmartCard + 'static,
    K: KeyStore,
{
    pub fn new(card: Arc<C>, store: K, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            card,
            store,
            config,
            state: SessionState::Idle,
            epoch: 0,
            poller: None,
            events_tx,
            events_rx,
            keys: KeyList::default(),
            upload_enabled: false,
            listener: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Epoch of the current (or next) polling run.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn card(&self) -> &Arc<C> {
        &self.card
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Load the key list and start polling.
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The session is already running
    /// - The key store cannot be read
    /// - The poller thread cannot be spawned
    pub fn start(&mut self) -> TumpaResult<()> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted.into());
        }
        self.refresh_keys()?;

        self.epoch += 1;
        self.spawn_poller()?;
        self.state = SessionState::PollingActive;
        info!(epoch = self.epoch, keys = self.keys.len(), "Session started");
        Ok(())
    }

    /// Take the token channel away from the poller.
    ///
    /// Returns once the poller thread has exited.
    pub fn begin_exclusive_workflow(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => return Err(SessionError::NotStarted),
            SessionState::WorkflowExclusive => return Err(SessionError::NotPollingActive),
            SessionState::PollingActive => {}
        }

        // Waits out a presence query already under way.
        if let Some(poller) = self.poller.take() {
            poller.stop_and_join();
        }
        // Anything the old run delivered is now stale.
        self.epoch += 1;
        self.state = SessionState::WorkflowExclusive;
        info!(epoch = self.epoch, "Exclusive workflow window opened");
        Ok(())
    }

    /// Give the token channel back to a fresh poller.
    pub fn end_exclusive_workflow(&mut self) -> TumpaResult<()> {
        if self.state != SessionState::WorkflowExclusive {
            return Err(SessionError::NotExclusive.into());
        }
        self.spawn_poller()?;
        self.state = SessionState::PollingActive;
        info!(epoch = self.epoch, "Exclusive workflow window closed, polling resumed");
        Ok(())
    }

    fn spawn_poller(&mut self) -> TumpaResult<()> {
        let poller = PresencePoller::spawn(
            Arc::clone(&self.card),
            self.config.poll_interval,
            self.epoch,
            self.events_tx.clone(),
        )?;
        self.poller = Some(poller);
        Ok(())
    }

    /// Register the presence listener, replacing any previous one.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Apply a presence observation.
    ///
    /// Only acted on while polling and while a key is selected; returns
    /// whether it was.
    pub fn on_presence_changed(&mut self, present: bool) -> bool {
        if !self.state.is_polling() {
            debug!(present, state = %self.state, "Presence ignored outside polling");
            return false;
        }
        if !self.keys.has_selection() {
            debug!(present, "Presence ignored, no key selected");
            return false;
        }

        self.upload_enabled = present;
        if let Some(listener) = self.listener.as_mut() {
            listener(present);
        }
        true
    }

    /// Whether the "upload to smartcard" action is currently offered.
    pub fn upload_enabled(&self) -> bool {
        self.upload_enabled && self.keys.has_selection()
    }

    fn is_current(&self, event: PresenceEvent) -> bool {
        if !self.state.is_polling() || event.epoch != self.epoch {
            debug!(
                event_epoch = event.epoch,
                epoch = self.epoch,
                state = %self.state,
                "Discarding stale presence event"
            );
            return false;
        }
        true
    }

    /// Apply every pending poller event. Returns how many were acted on.
    pub fn process_presence_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.is_current(event) && self.on_presence_changed(event.present) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until the current polling run reports, then apply the report.
    ///
    /// Returns `None` if nothing current arrived within `timeout` or the
    /// session is not polling.
    pub fn wait_for_presence(&mut self, timeout: Duration) -> Option<bool> {
        if !self.state.is_polling() {
            return None;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(event) if self.is_current(event) => {
                    self.on_presence_changed(event.present);
                    return Some(event.present);
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Keys in display order, newest first.
    pub fn keys(&self) -> &[Key] {
        self.keys.as_slice()
    }

    pub fn selected_key(&self) -> Option<&Key> {
        self.keys.selected()
    }

    pub fn select_key(&mut self, fingerprint: Option<Fingerprint>) -> TumpaResult<()> {
        self.keys.select(fingerprint)?;
        if !self.keys.has_selection() {
            self.upload_enabled = false;
        }
        Ok(())
    }

    /// Reload the key list from the key store.
    pub fn refresh_keys(&mut self) -> TumpaResult<()> {
        let keys = self.store.list_keys().map_err(|source| {
            warn!(error = %source, "Failed to list keys");
            CollaboratorError::KeyStore {
                operation: Operation::ListKeys,
                source,
            }
        })?;
        self.keys.replace(keys);
        debug!(count = self.keys.len(), "Key list refreshed");
        Ok(())
    }

    fn find_key(&self, fingerprint: &Fingerprint) -> Result<&Key, SessionError> {
        self.keys
            .get(fingerprint)
            .ok_or_else(|| SessionError::KeyNotFound(fingerprint.clone()))
    }

    /// Which subkey boxes the upload dialog may offer for `fingerprint`.
    /// All of them start checked.
    pub fn upload_prompt(&self, fingerprint: &Fingerprint) -> TumpaResult<SubkeyAvailability> {
        Ok(decode_availability(self.find_key(fingerprint)?))
    }

    /// Public key material of `fingerprint`, for the caller to write out.
    pub fn export_public_key(&self, fingerprint: &Fingerprint) -> TumpaResult<Vec<u8>> {
        Ok(self.find_key(fingerprint)?.public_key.clone())
    }

    /// Run one provisioning workflow.
    ///
    /// Token workflows requested while polling get an exclusive window of
    /// their own, closed again on every exit path. If the caller opened the
    /// window with [`begin_exclusive_workflow`](Self::begin_exclusive_workflow),
    /// a validation error leaves it open so the user can be asked again;
    /// any other result closes it. Key generation never takes the window.
    pub fn request_workflow(&mut self, workflow: Workflow) -> TumpaResult<Outcome> {
        let operation = workflow.operation();
        debug!(?workflow, state = %self.state, "Workflow requested");

        match self.state {
            SessionState::Idle => Err(SessionError::NotStarted.into()),
            SessionState::PollingActive if workflow.needs_token() => {
                self.begin_exclusive_workflow()?;
                let result = self.run_workflow(workflow);
                self.close_window(operation, result)
            }
            SessionState::PollingActive => self.run_workflow(workflow),
            SessionState::WorkflowExclusive => {
                let result = self.run_workflow(workflow);
                let keep_open = !operation.touches_token()
                    || matches!(&result, Err(error) if error.is_validation());
                if keep_open {
                    result
                } else {
                    self.close_window(operation, result)
                }
            }
        }
    }

    fn close_window(
        &mut self,
        operation: Operation,
        result: TumpaResult<Outcome>,
    ) -> TumpaResult<Outcome> {
        match self.end_exclusive_workflow() {
            Ok(()) => result,
            Err(error) => {
                warn!(%operation, %error, "Failed to resume polling");
                // The workflow's own error takes precedence.
                result.and(Err(error))
            }
        }
    }

    fn run_workflow(&mut self, workflow: Workflow) -> TumpaResult<Outcome> {
        let card = self.card.as_ref();
        match workflow {
            Workflow::ChangeUserPin { admin_pin, new_pin } => {
                change_user_pin(card, &admin_pin, &new_pin)
            }
            Workflow::ChangeAdminPin {
                admin_pin,
                new_admin_pin,
            } => change_admin_pin(card, &admin_pin, &new_admin_pin),
            Workflow::SetCardholderName { admin_pin, name } => {
                set_cardholder_name(card, &admin_pin, &name)
            }
            Workflow::SetPublicKeyUrl { admin_pin, url } => {
                set_public_key_url(card, &admin_pin, &url)
            }
            Workflow::UploadKey {
                fingerprint,
                admin_pin,
                passphrase,
                subkeys,
            } => {
                let key = match &fingerprint {
                    Some(fingerprint) => Some(self.find_key(fingerprint)?),
                    None => self.keys.selected(),
                };
                upload_key(card, key, &admin_pin, &passphrase, subkeys)
            }
            Workflow::ResetToken(confirmation) => reset_token(card, confirmation),
            Workflow::GenerateKey(params) => {
                let key = generate_key(&mut self.store, &params, Utc::now(), &self.config)?;
                self.keys.insert_front(key.clone());
                Ok(Outcome::KeyGenerated(key))
            }
        }
    }

    /// Stop polling and return to `Idle`. Waits for the poller thread.
    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop_and_join();
        }
        if self.state != SessionState::Idle {
            self.epoch += 1;
            self.state = SessionState::Idle;
            self.upload_enabled = false;
            info!("Session shut down");
        }
    }
}

impl<C, K> Drop for SessionCoordinator<C, K>
where
    C: SmartCard + 'static,
    K: KeyStore,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<C, K> std::fmt::Debug for SessionCoordinator<C, K>
where
    C: SmartCard + 'static,
    K: KeyStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("keys", &self.keys.len())
            .field("upload_enabled", &self.upload_enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recording::{Call, RecordingCard, RecordingKeyStore};
    use crate::error::{KeyStoreError, TokenError, TumpaError, ValidationError};
    use crate::model::{Confirmation, NewKeyParams, SubkeyMask};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::sync::Mutex;
    use std::thread;

    const INTERVAL: Duration = Duration::from_millis(5);
    const WAIT: Duration = Duration::from_secs(2);

    type TestSession = SessionCoordinator<RecordingCard, RecordingKeyStore>;

    fn key(byte: u8, days_ago: i64) -> Key {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
            - ChronoDuration::days(days_ago);
        Key {
            fingerprint: Fingerprint::from_bytes(&[byte; 20]),
            created_at,
            expires_at: None,
            user_ids: vec![format!("User {} <u{}@example.com>", byte, byte)],
            public_key: format!("public {}", byte).into_bytes(),
            secret_material: vec![byte; 8],
            capabilities: SubkeyAvailability::new(true, true, false),
        }
    }

    fn session_with(keys: Vec<Key>) -> (Arc<RecordingCard>, TestSession) {
        let card = Arc::new(RecordingCard::new());
        let config = SessionConfig::default().with_poll_interval(INTERVAL);
        let session = SessionCoordinator::new(
            Arc::clone(&card),
            RecordingKeyStore::with_keys(keys),
            config,
        );
        (card, session)
    }

    fn started(keys: Vec<Key>) -> (Arc<RecordingCard>, TestSession) {
        let (card, mut session) = session_with(keys);
        session.start().unwrap();
        (card, session)
    }

    fn change_url(admin_pin: &str) -> Workflow {
        Workflow::SetPublicKeyUrl {
            admin_pin: admin_pin.to_string(),
            url: "https://example.com/k.asc".to_string(),
        }
    }

    fn new_key_params(subkeys: SubkeyMask) -> NewKeyParams {
        NewKeyParams {
            name: "Jane Doe".to_string(),
            emails: vec!["jane@example.com".to_string()],
            passphrase: "redhat".to_string(),
            subkeys,
        }
    }

    #[test]
    fn test_start_and_restart() {
        let (_card, mut session) = session_with(vec![]);
        assert_eq!(session.state(), SessionState::Idle);

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::PollingActive);
        assert!(matches!(
            session.start(),
            Err(TumpaError::Session(SessionError::AlreadyStarted))
        ));

        session.shutdown();
        assert_eq!(session.state(), SessionState::Idle);
        session.start().unwrap();
        assert_eq!(session.state(), SessionState::PollingActive);
    }

    #[test]
    fn test_workflow_before_start() {
        let (card, mut session) = session_with(vec![]);
        let err = session.request_workflow(change_url("12345678")).unwrap_err();
        assert!(matches!(err, TumpaError::Session(SessionError::NotStarted)));
        assert!(card.calls().is_empty());
    }

    #[test]
    fn test_window_transitions() {
        let (_card, mut session) = started(vec![]);
        let epoch = session.epoch();

        session.begin_exclusive_workflow().unwrap();
        assert_eq!(session.state(), SessionState::WorkflowExclusive);
        assert_eq!(session.epoch(), epoch + 1);
        assert_eq!(
            session.begin_exclusive_workflow(),
            Err(SessionError::NotPollingActive)
        );

        session.end_exclusive_workflow().unwrap();
        assert_eq!(session.state(), SessionState::PollingActive);
        assert!(matches!(
            session.end_exclusive_workflow(),
            Err(TumpaError::Session(SessionError::NotExclusive))
        ));
    }

    #[test]
    fn test_token_workflow_always_resumes_polling() {
        let (card, mut session) = started(vec![]);

        let outcome = session.request_workflow(change_url("12345678")).unwrap();
        assert_eq!(outcome.message(), Some("Added public URL successfully."));
        assert_eq!(session.state(), SessionState::PollingActive);

        let err = session.request_workflow(change_url("1234567")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.state(), SessionState::PollingActive);

        card.fail_next(TokenError::Communication("reader unplugged".to_string()));
        let err = session.request_workflow(change_url("12345678")).unwrap_err();
        assert!(matches!(err, TumpaError::Collaborator(_)));
        assert_eq!(session.state(), SessionState::PollingActive);

        // Validation failure made no call.
        assert_eq!(card.calls().len(), 2);
    }

    #[test]
    fn test_caller_window_kept_open_for_reprompt() {
        let (card, mut session) = started(vec![]);
        session.begin_exclusive_workflow().unwrap();

        let err = session
            .request_workflow(Workflow::ChangeUserPin {
                admin_pin: "12345678".to_string(),
                new_pin: "123".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TumpaError::Validation(ValidationError::TooShort { min: 6, .. })
        ));
        assert_eq!(session.state(), SessionState::WorkflowExclusive);

        session
            .request_workflow(Workflow::ChangeUserPin {
                admin_pin: "12345678".to_string(),
                new_pin: "654321".to_string(),
            })
            .unwrap();
        assert_eq!(session.state(), SessionState::PollingActive);
        assert_eq!(card.calls().len(), 1);
    }

    #[test]
    fn test_declined_reset_touches_nothing() {
        let (card, mut session) = started(vec![]);
        let epoch = session.epoch();

        let outcome = session
            .request_workflow(Workflow::ResetToken(Confirmation::Declined))
            .unwrap();

        assert_eq!(outcome, Outcome::Declined);
        assert_eq!(session.epoch(), epoch);
        assert_eq!(session.state(), SessionState::PollingActive);
        assert!(card.calls().is_empty());
    }

    #[test]
    fn test_affirmative_reset_calls_once() {
        let (card, mut session) = started(vec![]);
        session
            .request_workflow(Workflow::ResetToken(Confirmation::Affirmative))
            .unwrap();
        assert_eq!(card.calls(), vec![Call::Reset]);
        assert_eq!(session.state(), SessionState::PollingActive);
    }

    #[test]
    fn test_generation_skips_window_and_selects_key() {
        let (_card, mut session) = started(vec![key(1, 10)]);
        let epoch = session.epoch();

        let outcome = session
            .request_workflow(Workflow::GenerateKey(new_key_params(SubkeyMask::ALL)))
            .unwrap();

        let Outcome::KeyGenerated(generated) = outcome else {
            panic!("expected a generated key");
        };
        assert_eq!(session.epoch(), epoch);
        assert_eq!(session.keys()[0].fingerprint, generated.fingerprint);
        assert_eq!(
            session.selected_key().map(|k| &k.fingerprint),
            Some(&generated.fingerprint)
        );
        assert_eq!(session.store().create_calls, 1);
    }

    #[test]
    fn test_generation_rejects_empty_mask_without_call() {
        let (_card, mut session) = started(vec![]);
        let err = session
            .request_workflow(Workflow::GenerateKey(new_key_params(SubkeyMask::NONE)))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.store().create_calls, 0);
        assert!(session.keys().is_empty());
    }

    #[test]
    fn test_upload_selected_key() {
        let (card, mut session) = started(vec![key(1, 10), key(2, 1)]);
        let fingerprint = Fingerprint::from_bytes(&[1; 20]);
        session.select_key(Some(fingerprint)).unwrap();

        session
            .request_workflow(Workflow::UploadKey {
                fingerprint: None,
                admin_pin: "12345678".to_string(),
                passphrase: "redhat".to_string(),
                subkeys: SubkeyMask::from_bits(3),
            })
            .unwrap();

        assert_eq!(
            card.calls(),
            vec![Call::Upload {
                key_material: vec![1; 8],
                admin_pin: "12345678".to_string(),
                passphrase: "redhat".to_string(),
                subkeys: SubkeyMask::from_bits(3),
            }]
        );
    }

    #[test]
    fn test_upload_unknown_fingerprint() {
        let (card, mut session) = started(vec![key(1, 1)]);
        let unknown = Fingerprint::from_bytes(&[7; 20]);
        let err = session
            .request_workflow(Workflow::UploadKey {
                fingerprint: Some(unknown.clone()),
                admin_pin: "12345678".to_string(),
                passphrase: "redhat".to_string(),
                subkeys: SubkeyMask::ALL,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TumpaError::Session(SessionError::KeyNotFound(fp)) if fp == unknown
        ));
        assert!(card.calls().is_empty());
        assert_eq!(session.state(), SessionState::PollingActive);
    }

    #[test]
    fn test_presence_needs_selection() {
        let (_card, mut session) = started(vec![key(1, 1)]);
        session.select_key(None).unwrap();
        assert!(!session.on_presence_changed(true));
        assert!(!session.upload_enabled());

        session
            .select_key(Some(Fingerprint::from_bytes(&[1; 20])))
            .unwrap();
        assert!(session.on_presence_changed(true));
        assert!(session.upload_enabled());

        session.select_key(None).unwrap();
        assert!(!session.upload_enabled());
    }

    #[test]
    fn test_listener_receives_current_events() {
        let (_card, mut session) = started(vec![key(1, 1)]);
        session
            .select_key(Some(Fingerprint::from_bytes(&[1; 20])))
            .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.subscribe(move |present| sink.lock().unwrap().push(present));

        assert_eq!(session.wait_for_presence(WAIT), Some(true));
        assert_eq!(seen.lock().unwrap().first(), Some(&true));
    }

    #[test]
    fn test_stale_events_discarded() {
        let (card, mut session) = started(vec![key(1, 1)]);
        session
            .select_key(Some(Fingerprint::from_bytes(&[1; 20])))
            .unwrap();
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        session.subscribe(move |_| *sink.lock().unwrap() += 1);

        // Let the first run queue up some events, then suspend.
        while card.presence_queries() < 3 {
            thread::sleep(INTERVAL);
        }
        session.begin_exclusive_workflow().unwrap();
        thread::sleep(INTERVAL * 4);

        assert_eq!(session.process_presence_events(), 0);
        assert_eq!(session.wait_for_presence(INTERVAL), None);
        assert_eq!(*seen.lock().unwrap(), 0);

        session.end_exclusive_workflow().unwrap();
        assert_eq!(session.wait_for_presence(WAIT), Some(true));
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_shutdown_stops_polling() {
        let (card, mut session) = started(vec![]);
        while card.presence_queries() == 0 {
            thread::sleep(INTERVAL);
        }

        session.shutdown();
        let queries = card.presence_queries();
        thread::sleep(INTERVAL * 10);
        assert_eq!(card.presence_queries(), queries);
        assert_eq!(session.process_presence_events(), 0);
    }

    #[test]
    fn test_upload_prompt_and_export() {
        let (_card, session) = started(vec![key(4, 1)]);
        let fingerprint = Fingerprint::from_bytes(&[4; 20]);

        let availability = session.upload_prompt(&fingerprint).unwrap();
        assert_eq!(availability.default_selection(), SubkeyMask::from_bits(3));
        assert_eq!(
            session.export_public_key(&fingerprint).unwrap(),
            b"public 4".to_vec()
        );

        let unknown = Fingerprint::from_bytes(&[5; 20]);
        assert!(session.export_public_key(&unknown).is_err());
    }

    #[test]
    fn test_keys_listed_newest_first() {
        let (_card, session) = started(vec![key(1, 30), key(2, 1), key(3, 10)]);
        let order: Vec<_> = session
            .keys()
            .iter()
            .map(|k| k.fingerprint.clone())
            .collect();
        assert_eq!(
            order,
            vec![
                Fingerprint::from_bytes(&[2; 20]),
                Fingerprint::from_bytes(&[3; 20]),
                Fingerprint::from_bytes(&[1; 20]),
            ]
        );
    }

    #[test]
    fn test_suspension_waits_for_query_in_flight() {
        let (card, mut session) = started(vec![]);
        card.set_presence_delay(Duration::from_millis(100));
        while card.queries_in_flight() == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        session.request_workflow(change_url("12345678")).unwrap();
        assert_eq!(card.writes_during_query(), 0);

        // Let the resumed poller run a few slow queries.
        while card.presence_queries() < 3 {
            thread::sleep(INTERVAL);
        }
        assert_eq!(card.max_queries_in_flight(), 1);
    }

    #[test]
    fn test_start_selects_newest_key() {
        let (_card, session) = started(vec![key(1, 10), key(2, 1)]);
        assert_eq!(
            session.selected_key().map(|k| k.fingerprint.clone()),
            Some(Fingerprint::from_bytes(&[2; 20]))
        );
    }

    #[test]
    fn test_start_fails_when_store_unreadable() {
        let card = Arc::new(RecordingCard::new());
        let mut store = RecordingKeyStore::new();
        store.fail_list = Some(KeyStoreError::ReadFailed {
            reason: "keyring locked".to_string(),
        });
        let mut session = SessionCoordinator::new(card, store, SessionConfig::default());

        let err = session.start().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error during loading keys: Failed to read key store: keyring locked"
        );
        assert_eq!(session.state(), SessionState::Idle);
    }
}
