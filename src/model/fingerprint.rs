use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Stable identifier of a key, stored as uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name used when exporting the public key.
    pub fn export_file_name(&self) -> String {
        format!("{}.pub", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    /// Parse a hex fingerprint, ignoring spaces and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(FingerprintError::Empty);
        }
        let bytes = hex::decode(&compact).map_err(|e| FingerprintError::InvalidHex {
            reason: e.to_string(),
        })?;
        Ok(Self::from_bytes(&bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Fingerprint cannot be empty")]
    Empty,

    #[error("Fingerprint is not valid hex: {reason}")]
    InvalidHex { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_case_and_spaces() {
        let fp: Fingerprint = "5286 c32e 7c71 e14c".parse().unwrap();
        assert_eq!(fp.as_str(), "5286C32E7C71E14C");
        assert_eq!(fp.export_file_name(), "5286C32E7C71E14C.pub");
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(matches!(
            "not-a-fingerprint".parse::<Fingerprint>(),
            Err(FingerprintError::InvalidHex { .. })
        ));
        assert_eq!("".parse::<Fingerprint>(), Err(FingerprintError::Empty));
    }
}
