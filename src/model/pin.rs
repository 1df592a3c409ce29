use std::fmt;

use crate::error::ValidationError;
use crate::logic::validation::{
    validate_admin_pin, validate_secret, ADMIN_PIN_MIN_LENGTH, SECRET_MIN_LENGTH,
};

/// Admin pin (PW3) accepted for a token mutation.
///
/// Surrounding whitespace is stripped before the length check.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminPin(String);

impl AdminPin {
    pub const DEFAULT: &'static str = "12345678";

    pub fn new(pin: &str) -> Result<Self, ValidationError> {
        let pin = pin.trim();
        validate_admin_pin(pin)?;
        Ok(Self(pin.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for AdminPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdminPin([REDACTED])")
    }
}

/// A new pin or key passphrase, checked against a minimum length.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub const USER_PIN_LABEL: &'static str = "New User pin";
    pub const ADMIN_PIN_LABEL: &'static str = "New Admin pin";
    pub const PASSPHRASE_LABEL: &'static str = "Key passphrase";

    pub fn new(value: &str, min_len: usize, label: &'static str) -> Result<Self, ValidationError> {
        let value = value.trim();
        validate_secret(value, min_len, label)?;
        Ok(Self(value.to_string()))
    }

    pub fn user_pin(value: &str) -> Result<Self, ValidationError> {
        Self::new(value, SECRET_MIN_LENGTH, Self::USER_PIN_LABEL)
    }

    pub fn new_admin_pin(value: &str) -> Result<Self, ValidationError> {
        Self::new(value, ADMIN_PIN_MIN_LENGTH, Self::ADMIN_PIN_LABEL)
    }

    /// Passphrase for an existing or new key. Blank is reported separately
    /// from too short.
    pub fn passphrase(value: &str) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Blank {
                field: Self::PASSPHRASE_LABEL,
            });
        }
        Self::new(value, SECRET_MIN_LENGTH, Self::PASSPHRASE_LABEL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}
