//! Error types for tumpa
//!
//! This module defines the error hierarchy for all session and workflow operations.
//! Errors are organized hierarchically and use thiserror for implementation.

use thiserror::Error;

use crate::model::Fingerprint;

/// Result type alias for tumpa operations
///
/// This is a convenience alias for `Result<T, TumpaError>`.
pub type TumpaResult<T> = Result<T, TumpaError>;

/// Top-level error type for all tumpa operations
#[derive(Error, Debug)]
pub enum TumpaError {
    /// Input rejected before any collaborator was called
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Token or key store call failed
    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),

    /// Operation requested in the wrong session state
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Filesystem error while exporting key material
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TumpaError {
    /// True for errors the user can fix by re-entering input.
    pub fn is_validation(&self) -> bool {
        matches!(self, TumpaError::Validation(_))
    }
}

/// Input validation errors
///
/// Every variant names the offending field so it can be reported as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be {min} character or more.")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} cannot be blank.")]
    Blank { field: &'static str },

    #[error("There must be at least one {field}.")]
    Empty { field: &'static str },

    #[error("At least one subkey must be selected")]
    NoSubkeySelected,

    #[error("Key {fingerprint} has no {capability} subkey")]
    SubkeyUnavailable {
        fingerprint: Fingerprint,
        capability: &'static str,
    },

    #[error("Please select a key from the list.")]
    NoKeySelected,
}

impl ValidationError {
    /// The user-facing field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Blank { field }
            | ValidationError::Empty { field } => field,
            ValidationError::NoSubkeySelected | ValidationError::SubkeyUnavailable { .. } => {
                "Subkeys"
            }
            ValidationError::NoKeySelected => "Key",
        }
    }
}

/// Operations that reach a collaborator, named as they appear in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ChangeUserPin,
    ChangeAdminPin,
    SetCardholderName,
    SetPublicKeyUrl,
    UploadKey,
    ResetToken,
    GenerateKey,
    ListKeys,
}

impl Operation {
    /// Short description used in "Error during ..." reports.
    pub fn describe(self) -> &'static str {
        match self {
            Operation::ChangeUserPin => "changing user pin",
            Operation::ChangeAdminPin => "changing admin pin",
            Operation::SetCardholderName => "adding name",
            Operation::SetPublicKeyUrl => "adding public URL",
            Operation::UploadKey => "upload to smartcard",
            Operation::ResetToken => "smartcard reset",
            Operation::GenerateKey => "generating new key",
            Operation::ListKeys => "loading keys",
        }
    }

    /// Whether the operation needs the token channel to itself.
    pub fn touches_token(self) -> bool {
        !matches!(self, Operation::GenerateKey | Operation::ListKeys)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// A collaborator call failed; the cause is reported verbatim and never retried
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Error during {operation}: {source}")]
    Token {
        operation: Operation,
        #[source]
        source: TokenError,
    },

    #[error("Error during {operation}: {source}")]
    KeyStore {
        operation: Operation,
        #[source]
        source: KeyStoreError,
    },
}

impl CollaboratorError {
    pub fn operation(&self) -> Operation {
        match self {
            CollaboratorError::Token { operation, .. }
            | CollaboratorError::KeyStore { operation, .. } => *operation,
        }
    }
}

/// Smartcard errors surfaced by token ports
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("No smart card connected")]
    NotConnected,

    #[error("PIN is blocked")]
    PinBlocked,

    #[error("PIN incorrect, {retries_remaining} retries remaining")]
    PinIncorrect { retries_remaining: u8 },

    #[error("Key material rejected: {reason}")]
    InvalidKeyMaterial { reason: String },

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Card error: {0}")]
    Card(String),
}

/// Key store errors surfaced by the key store port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("Failed to generate key: {reason}")]
    GenerationFailed { reason: String },

    #[error("Failed to read key store: {reason}")]
    ReadFailed { reason: String },
}

/// Session state machine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session has not been started")]
    NotStarted,

    #[error("Session is already running")]
    AlreadyStarted,

    #[error("An exclusive workflow is already in progress")]
    NotPollingActive,

    #[error("No exclusive workflow is in progress")]
    NotExclusive,

    #[error("Key not found: {0}")]
    KeyNotFound(Fingerprint),
}
