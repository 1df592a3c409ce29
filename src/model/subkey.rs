use std::fmt;

/// Subkey selection as the token layer consumes it.
///
/// Bit 0 is encryption, bit 1 signing, bit 2 authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubkeyMask(u8);

impl SubkeyMask {
    pub const ENCRYPTION: u8 = 1;
    pub const SIGNING: u8 = 2;
    pub const AUTHENTICATION: u8 = 4;

    pub const NONE: SubkeyMask = SubkeyMask(0);
    pub const ALL: SubkeyMask = SubkeyMask(7);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 7)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn encryption(self) -> bool {
        self.0 & Self::ENCRYPTION != 0
    }

    pub const fn signing(self) -> bool {
        self.0 & Self::SIGNING != 0
    }

    pub const fn authentication(self) -> bool {
        self.0 & Self::AUTHENTICATION != 0
    }

    /// First capability named by this mask that `available` lacks.
    pub fn first_missing(self, available: SubkeyAvailability) -> Option<&'static str> {
        if self.encryption() && !available.encryption {
            Some("encryption")
        } else if self.signing() && !available.signing {
            Some("signing")
        } else if self.authentication() && !available.authentication {
            Some("authentication")
        } else {
            None
        }
    }
}

impl fmt::Display for SubkeyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.encryption() {
            names.push("encryption");
        }
        if self.signing() {
            names.push("signing");
        }
        if self.authentication() {
            names.push("authentication");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// Which subkeys a key actually carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubkeyAvailability {
    pub encryption: bool,
    pub signing: bool,
    pub authentication: bool,
}

impl SubkeyAvailability {
    pub fn new(encryption: bool, signing: bool, authentication: bool) -> Self {
        Self {
            encryption,
            signing,
            authentication,
        }
    }

    /// Initial selection for an upload: every available subkey is checked.
    pub fn default_selection(self) -> SubkeyMask {
        crate::logic::encode(self.encryption, self.signing, self.authentication)
    }
}

impl From<SubkeyMask> for SubkeyAvailability {
    fn from(mask: SubkeyMask) -> Self {
        Self::new(mask.encryption(), mask.signing(), mask.authentication())
    }
}
