use chrono::{DateTime, Duration, Utc};

use super::{CipherSuite, Secret, SubkeyMask};
use crate::error::ValidationError;
use crate::logic::validate_nonempty_list;

/// Validity window of newly generated keys, in days.
pub const DEFAULT_VALIDITY_DAYS: i64 = 3 * 365;

const NAME_LABEL: &str = "Name";
const EMAIL_LABEL: &str = "email";

/// Raw input of the "new key" form.
#[derive(Clone, PartialEq, Eq)]
pub struct NewKeyParams {
    pub name: String,
    pub emails: Vec<String>,
    pub passphrase: String,
    pub subkeys: SubkeyMask,
}

impl std::fmt::Debug for NewKeyParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewKeyParams")
            .field("name", &self.name)
            .field("emails", &self.emails)
            .field("subkeys", &self.subkeys)
            .finish_non_exhaustive()
    }
}

/// Everything the key store needs to create a key. Built fresh per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub passphrase: Secret,
    pub user_ids: Vec<String>,
    pub cipher_suite: CipherSuite,
    pub created_at: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub subkeys_expire: bool,
    pub subkeys: SubkeyMask,
}

impl GenerationRequest {
    /// Validate the form and derive the request.
    ///
    /// Checks run in form order: name, emails, passphrase, subkeys.
    pub fn derive(
        params: &NewKeyParams,
        now: DateTime<Utc>,
        validity_days: i64,
        cipher_suite: CipherSuite,
    ) -> Result<Self, ValidationError> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Blank { field: NAME_LABEL });
        }

        let user_ids: Vec<String> = params
            .emails
            .iter()
            .flat_map(|entry| entry.lines())
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(|email| format!("{} <{}>", name, email))
            .collect();
        validate_nonempty_list(&user_ids, EMAIL_LABEL)?;

        let passphrase = Secret::passphrase(&params.passphrase)?;

        if params.subkeys.is_empty() {
            return Err(ValidationError::NoSubkeySelected);
        }

        Ok(Self {
            passphrase,
            user_ids,
            cipher_suite,
            created_at: now,
            expiration: now + Duration::days(validity_days),
            subkeys_expire: true,
            subkeys: params.subkeys,
        })
    }
}
