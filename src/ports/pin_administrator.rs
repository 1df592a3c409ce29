//! PinAdministrator trait - capability to replace token pins

use crate::error::TokenError;
use crate::model::{AdminPin, Secret};

/// Capability to replace the user pin (PW1) and admin pin (PW3).
pub trait PinAdministrator {
    /// Set a new user pin, authorised by the admin pin
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - No token is connected
    /// - The admin pin is wrong or blocked
    fn set_user_pin(&self, admin_pin: &AdminPin, new_pin: &Secret) -> Result<(), TokenError>;

    /// Replace the admin pin
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - No token is connected
    /// - The current admin pin is wrong or blocked
    fn set_admin_pin(&self, admin_pin: &AdminPin, new_admin_pin: &Secret)
        -> Result<(), TokenError>;
}
