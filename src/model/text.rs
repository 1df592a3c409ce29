use crate::error::ValidationError;
use crate::logic::validation::{validate_text_field, TEXT_FIELD_MAX_LENGTH};

/// Free-text value written to a card data object (name, URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText(String);

impl CardText {
    pub const NAME_LABEL: &'static str = "Name";
    pub const URL_LABEL: &'static str = "Public URL";

    pub fn new(value: &str, label: &'static str) -> Result<Self, ValidationError> {
        let value = value.trim();
        validate_text_field(value, TEXT_FIELD_MAX_LENGTH, label)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
