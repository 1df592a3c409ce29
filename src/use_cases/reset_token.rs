//! Reset token use case
//!
//! Factory-resets the token once the user has confirmed. A declined reset
//! makes no call.

use tracing::{info, warn};

use super::Outcome;
use crate::error::{CollaboratorError, Operation, TumpaResult};
use crate::model::Confirmation;
use crate::ports::TokenResetter;

/// Factory-reset the token, but only after an affirmative answer.
///
/// A declined confirmation makes no call and reports nothing.
pub fn reset_token<C>(card: &C, confirmation: Confirmation) -> TumpaResult<Outcome>
where
    C: TokenResetter + ?Sized,
{
    if !confirmation.is_affirmative() {
        info!("Token reset declined");
        return Ok(Outcome::Declined);
    }

    card.reset().map_err(|source| {
        warn!(error = %source, "Token reset failed");
        CollaboratorError::Token {
            operation: Operation::ResetToken,
            source,
        }
    })?;

    info!("Token reset to factory state");
    Ok(Outcome::completed(Operation::ResetToken))
}
