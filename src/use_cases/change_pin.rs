//! Change pin use cases
//!
//! Both replace a token pin under the authority of the current admin pin.

use tracing::{info, warn};

use super::Outcome;
use crate::error::{CollaboratorError, Operation, TumpaResult};
use crate::model::{AdminPin, Secret};
use crate::ports::PinAdministrator;

/// Replace the user pin (PW1)
///
/// # Errors
///
/// Returns errors if:
/// - The admin pin is shorter than 8 characters
/// - The new pin is shorter than 6 characters
/// - The token rejects the change
pub fn change_user_pin<C>(card: &C, admin_pin: &str, new_pin: &str) -> TumpaResult<Outcome>
where
    C: PinAdministrator + ?Sized,
{
    let admin_pin = AdminPin::new(admin_pin)?;
    let new_pin = Secret::user_pin(new_pin)?;

    card.set_user_pin(&admin_pin, &new_pin).map_err(|source| {
        warn!(error = %source, "Token rejected user pin change");
        CollaboratorError::Token {
            operation: Operation::ChangeUserPin,
            source,
        }
    })?;

    info!("User pin changed");
    Ok(Outcome::completed(Operation::ChangeUserPin))
}

/// Replace the admin pin (PW3)
///
/// # Errors
///
/// Returns errors if:
/// - Either pin is shorter than 8 characters
/// - The token rejects the change
pub fn change_admin_pin<C>(card: &C, admin_pin: &str, new_admin_pin: &str) -> TumpaResult<Outcome>
where
    C: PinAdministrator + ?Sized,
{
    let admin_pin = AdminPin::new(admin_pin)?;
    let new_admin_pin = Secret::new_admin_pin(new_admin_pin)?;

    card.set_admin_pin(&admin_pin, &new_admin_pin)
        .map_err(|source| {
            warn!(error = %source, "Token rejected admin pin change");
            CollaboratorError::Token {
                operation: Operation::ChangeAdminPin,
                source,
            }
        })?;

    info!("Admin pin changed");
    Ok(Outcome::completed(Operation::ChangeAdminPin))
}
