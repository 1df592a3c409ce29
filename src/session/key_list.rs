//! The key list shown to the user, newest first, with at most one selection.
//!
//! Loading a non-empty list selects the newest key unless the current
//! selection is still there.

use crate::error::SessionError;
use crate::model::{Fingerprint, Key};

#[derive(Debug, Clone, Default)]
pub struct KeyList {
    keys: Vec<Key>,
    selected: Option<Fingerprint>,
}

impl KeyList {
    pub fn new(keys: Vec<Key>) -> Self {
        let mut list = Self::default();
        list.replace(keys);
        list
    }

    /// Replace the contents, keeping the selection if the key is still there
    /// and selecting the newest key otherwise.
    pub fn replace(&mut self, mut keys: Vec<Key>) {
        sort_newest_first(&mut keys);
        self.keys = keys;
        let still_listed = self
            .selected
            .as_ref()
            .is_some_and(|fingerprint| self.get(fingerprint).is_some());
        if !still_listed {
            self.selected = self.keys.first().map(|k| k.fingerprint.clone());
        }
    }

    /// Put a freshly generated key at the top and select it.
    pub fn insert_front(&mut self, key: Key) {
        self.keys.retain(|k| k.fingerprint != key.fingerprint);
        self.selected = Some(key.fingerprint.clone());
        self.keys.insert(0, key);
    }

    pub fn select(&mut self, fingerprint: Option<Fingerprint>) -> Result<(), SessionError> {
        if let Some(fingerprint) = &fingerprint {
            if self.get(fingerprint).is_none() {
                return Err(SessionError::KeyNotFound(fingerprint.clone()));
            }
        }
        self.selected = fingerprint;
        Ok(())
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Key> {
        self.keys.iter().find(|k| &k.fingerprint == fingerprint)
    }

    pub fn selected(&self) -> Option<&Key> {
        self.selected.as_ref().and_then(|fp| self.get(fp))
    }

    pub fn has_selection(&self) -> bool {
        self.selected.is_some()
    }

    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn sort_newest_first(keys: &mut [Key]) {
    keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
