//! Use cases (orchestration)
//!
//! One function per provisioning workflow. Each validates its raw input
//! completely before calling exactly one collaborator, and reports the
//! result as an [`Outcome`]. Suspending and resuming presence polling is
//! the session coordinator's job, not theirs.

mod cardholder;
mod change_pin;
mod generate_key;
mod reset_token;
mod upload_key;

use std::fmt;

pub use cardholder::{set_cardholder_name, set_public_key_url};
pub use change_pin::{change_admin_pin, change_user_pin};
pub use generate_key::generate_key;
pub use reset_token::reset_token;
pub use upload_key::upload_key;

use crate::error::Operation;
use crate::model::{Confirmation, Fingerprint, Key, NewKeyParams, SubkeyMask};

const KEY_GENERATED_MESSAGE: &str = "Generated keys successfully!";

/// Result of a workflow that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The collaborator accepted the change
    Completed {
        operation: Operation,
        message: &'static str,
    },
    /// A new key was created in the key store
    KeyGenerated(Key),
    /// The user declined a destructive action; nothing was called
    Declined,
}

impl Outcome {
    pub fn completed(operation: Operation) -> Self {
        let message = match operation {
            Operation::ChangeUserPin => "Changed user pin successfully.",
            Operation::ChangeAdminPin => "Changed admin pin successfully.",
            Operation::SetCardholderName => "Added name successfully.",
            Operation::SetPublicKeyUrl => "Added public URL successfully.",
            Operation::UploadKey => "Uploaded to the smartcard successfully.",
            Operation::ResetToken => "Smartcard successfully reset.",
            Operation::GenerateKey => KEY_GENERATED_MESSAGE,
            Operation::ListKeys => "Loaded keys.",
        };
        Outcome::Completed { operation, message }
    }

    /// Confirmation to show the user, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Outcome::Completed { message, .. } => Some(message),
            Outcome::KeyGenerated(_) => Some(KEY_GENERATED_MESSAGE),
            Outcome::Declined => None,
        }
    }
}

/// A provisioning request as entered by the user, not yet validated
#[derive(Clone, PartialEq, Eq)]
pub enum Workflow {
    ChangeUserPin {
        admin_pin: String,
        new_pin: String,
    },
    ChangeAdminPin {
        admin_pin: String,
        new_admin_pin: String,
    },
    SetCardholderName {
        admin_pin: String,
        name: String,
    },
    SetPublicKeyUrl {
        admin_pin: String,
        url: String,
    },
    /// Upload subkeys of `fingerprint`, or of the selected key when `None`
    UploadKey {
        fingerprint: Option<Fingerprint>,
        admin_pin: String,
        passphrase: String,
        subkeys: SubkeyMask,
    },
    ResetToken(Confirmation),
    GenerateKey(NewKeyParams),
}

impl Workflow {
    pub fn operation(&self) -> Operation {
        match self {
            Workflow::ChangeUserPin { .. } => Operation::ChangeUserPin,
            Workflow::ChangeAdminPin { .. } => Operation::ChangeAdminPin,
            Workflow::SetCardholderName { .. } => Operation::SetCardholderName,
            Workflow::SetPublicKeyUrl { .. } => Operation::SetPublicKeyUrl,
            Workflow::UploadKey { .. } => Operation::UploadKey,
            Workflow::ResetToken(_) => Operation::ResetToken,
            Workflow::GenerateKey(_) => Operation::GenerateKey,
        }
    }

    /// Whether running the workflow writes to the token.
    ///
    /// A declined reset does not.
    pub fn needs_token(&self) -> bool {
        match self {
            Workflow::ResetToken(confirmation) => confirmation.is_affirmative(),
            other => other.operation().touches_token(),
        }
    }
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workflow::SetCardholderName { name, .. } => f
                .debug_struct("SetCardholderName")
                .field("name", name)
                .finish_non_exhaustive(),
            Workflow::SetPublicKeyUrl { url, .. } => f
                .debug_struct("SetPublicKeyUrl")
                .field("url", url)
                .finish_non_exhaustive(),
            Workflow::UploadKey {
                fingerprint,
                subkeys,
                ..
            } => f
                .debug_struct("UploadKey")
                .field("fingerprint", fingerprint)
                .field("subkeys", subkeys)
                .finish_non_exhaustive(),
            Workflow::ResetToken(confirmation) => {
                f.debug_tuple("ResetToken").field(confirmation).finish()
            }
            Workflow::GenerateKey(params) => f.debug_tuple("GenerateKey").field(params).finish(),
            other => write!(f, "{:?} {{ .. }}", other.operation()),
        }
    }
}
