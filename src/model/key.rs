use chrono::{DateTime, Utc};

use super::{Fingerprint, SubkeyAvailability};

/// A key as held by the key store.
///
/// Immutable once created. `secret_material` is opaque to this crate and is
/// handed unchanged to the token uploader.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    pub fingerprint: Fingerprint,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_ids: Vec<String>,
    pub public_key: Vec<u8>,
    pub secret_material: Vec<u8>,
    pub capabilities: SubkeyAvailability,
}

impl Key {
    pub fn capabilities(&self) -> SubkeyAvailability {
        self.capabilities
    }

    pub fn primary_user_id(&self) -> Option<&str> {
        self.user_ids.first().map(String::as_str)
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("fingerprint", &self.fingerprint)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("user_ids", &self.user_ids)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
