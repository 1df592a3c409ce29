//! Credential and text-field validation
//!
//! Pure functions with no side effects. Each failure names the field it
//! refers to so the caller can report it without further lookup.

use crate::error::ValidationError;

pub const ADMIN_PIN_LABEL: &str = "Admin pin";
pub const ADMIN_PIN_MIN_LENGTH: usize = 8;
pub const SECRET_MIN_LENGTH: usize = 6;
pub const TEXT_FIELD_MAX_LENGTH: usize = 35;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_admin_pin(s: &str) -> Result<(), ValidationError> {
    validate_secret(s, ADMIN_PIN_MIN_LENGTH, ADMIN_PIN_LABEL)
}

pub fn validate_secret(s: &str, min_len: usize, label: &'static str) -> Result<(), ValidationError> {
    if char_len(s) < min_len {
        return Err(ValidationError::TooShort {
            field: label,
            min: min_len,
        });
    }
    Ok(())
}

pub fn validate_text_field(
    s: &str,
    max_len: usize,
    label: &'static str,
) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::Blank { field: label });
    }
    if char_len(s) > max_len {
        return Err(ValidationError::TooLong {
            field: label,
            max: max_len,
        });
    }
    Ok(())
}

pub fn validate_nonempty_list<T>(items: &[T], label: &'static str) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::Empty { field: label });
    }
    Ok(())
}
