//! Cardholder data use cases

use tracing::{info, warn};

use super::Outcome;
use crate::error::{CollaboratorError, Operation, TumpaResult};
use crate::logic::encode_cardholder_name;
use crate::model::{AdminPin, CardText};
use crate::ports::CardholderEditor;

/// Write the cardholder name in "Last<<Middle<<First" form.
pub fn set_cardholder_name<C>(card: &C, admin_pin: &str, name: &str) -> TumpaResult<Outcome>
where
    C: CardholderEditor + ?Sized,
{
    let admin_pin = AdminPin::new(admin_pin)?;
    let name = CardText::new(name, CardText::NAME_LABEL)?;
    let encoded = encode_cardholder_name(name.as_str());

    card.set_name(&admin_pin, encoded.as_bytes())
        .map_err(|source| {
            warn!(error = %source, "Token rejected cardholder name");
            CollaboratorError::Token {
                operation: Operation::SetCardholderName,
                source,
            }
        })?;

    info!(name = %encoded, "Cardholder name set");
    Ok(Outcome::completed(Operation::SetCardholderName))
}

/// Write the URL where the public key can be fetched.
pub fn set_public_key_url<C>(card: &C, admin_pin: &str, url: &str) -> TumpaResult<Outcome>
where
    C: CardholderEditor + ?Sized,
{
    let admin_pin = AdminPin::new(admin_pin)?;
    let url = CardText::new(url, CardText::URL_LABEL)?;

    card.set_url(&admin_pin, url.as_str().as_bytes())
        .map_err(|source| {
            warn!(error = %source, "Token rejected public key URL");
            CollaboratorError::Token {
                operation: Operation::SetPublicKeyUrl,
                source,
            }
        })?;

    info!(url = url.as_str(), "Public key URL set");
    Ok(Outcome::completed(Operation::SetPublicKeyUrl))
}
